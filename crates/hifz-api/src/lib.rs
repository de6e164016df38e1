//! JSON REST API for Hifz.
//!
//! Exposes an axum [`Router`] backed by any
//! [`hifz_core::kv::KeyValueStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", hifz_api::api_router(AppState::new(store)))
//! ```

pub mod configurations;
pub mod error;
pub mod lessons;
pub mod people;
pub mod records;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use hifz_core::{
  kv::KeyValueStore,
  repo::{LessonPlanRepository, PeopleRepository, StudyPlanRepository},
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Every repository wraps a clone
/// of the same store.
pub struct AppState<K> {
  pub study_plans:  Arc<StudyPlanRepository<K>>,
  pub lesson_plans: Arc<LessonPlanRepository<K>>,
  pub people:       Arc<PeopleRepository<K>>,
}

impl<K> Clone for AppState<K> {
  fn clone(&self) -> Self {
    Self {
      study_plans:  self.study_plans.clone(),
      lesson_plans: self.lesson_plans.clone(),
      people:       self.people.clone(),
    }
  }
}

impl<K: KeyValueStore + Clone> AppState<K> {
  pub fn new(store: K) -> Self {
    Self {
      study_plans:  Arc::new(StudyPlanRepository::new(store.clone())),
      lesson_plans: Arc::new(LessonPlanRepository::new(store.clone())),
      people:       Arc::new(PeopleRepository::new(store)),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<K>(state: AppState<K>) -> Router<()>
where
  K: KeyValueStore + 'static,
{
  Router::new()
    // Templates and drafts
    .route("/templates", get(configurations::templates))
    .route(
      "/subscribers/{sid}/drafts",
      post(configurations::new_draft),
    )
    // Configurations
    .route(
      "/subscribers/{sid}/configurations",
      get(configurations::list::<K>).post(configurations::save::<K>),
    )
    .route(
      "/configurations/{id}",
      get(configurations::get_one::<K>).delete(configurations::delete_one::<K>),
    )
    .route(
      "/configurations/{id}/duplicate",
      post(configurations::duplicate::<K>),
    )
    .route(
      "/teachers/{tid}/configurations",
      get(configurations::for_teacher::<K>),
    )
    // Recall database
    .route(
      "/configurations/{id}/records",
      get(records::list::<K>)
        .post(records::create::<K>)
        .put(records::replace::<K>),
    )
    .route(
      "/configurations/{id}/records/{rid}",
      put(records::update::<K>).delete(records::delete_one::<K>),
    )
    .route("/configurations/{id}/lookup", post(records::lookup::<K>))
    .route(
      "/configurations/{id}/fields/{fid}/values",
      get(records::unique_values::<K>),
    )
    .route("/configurations/{id}/import", post(records::import::<K>))
    // Lesson plans
    .route("/lesson-plans", post(lessons::create::<K>))
    .route("/lesson-plans/{id}", get(lessons::get_one::<K>))
    .route("/lesson-plans/{id}/values", put(lessons::edit::<K>))
    .route("/lesson-plans/{id}/submit", post(lessons::submit::<K>))
    .route("/lesson-plans/{id}/approve", post(lessons::approve::<K>))
    .route("/lesson-plans/{id}/reject", post(lessons::reject::<K>))
    .route("/lesson-plans/{id}/duplicate", post(lessons::duplicate::<K>))
    .route("/lesson-plans/{id}/apply", post(lessons::apply::<K>))
    .route("/teachers/{tid}/lesson-plans", get(lessons::for_teacher::<K>))
    .route("/students/{id}/progress", get(lessons::progress::<K>))
    // People
    .route(
      "/subscribers/{sid}/teachers",
      get(people::list_teachers::<K>).post(people::create_teacher::<K>),
    )
    .route(
      "/subscribers/{sid}/students",
      get(people::list_students::<K>).post(people::create_student::<K>),
    )
    .route("/teachers/{tid}", get(people::get_teacher::<K>))
    .route("/halaqat/{hid}/students", get(people::halaqa_students::<K>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
