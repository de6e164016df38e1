//! Handlers for lesson plans and student progress.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/lesson-plans` | Body: [`NewLessonPlan`]; 400 if the configuration is not assigned to the teacher |
//! | `GET`  | `/lesson-plans/:id` | |
//! | `PUT`  | `/lesson-plans/:id/values` | 409 once approved |
//! | `POST` | `/lesson-plans/:id/submit` | draft → pending |
//! | `POST` | `/lesson-plans/:id/approve` | Body: `{"note":"..."}` (optional) |
//! | `POST` | `/lesson-plans/:id/reject` | Body: `{"note":"..."}` (required) |
//! | `POST` | `/lesson-plans/:id/duplicate` | Body: `{"date":"YYYY-MM-DD"}`; defaults to today |
//! | `POST` | `/lesson-plans/:id/apply` | Push values to enrolled students |
//! | `GET`  | `/teachers/:tid/lesson-plans` | Newest first |
//! | `GET`  | `/students/:id/progress` | Oldest first |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use hifz_core::{
  kv::KeyValueStore,
  lesson::{LessonPlan, NewLessonPlan, StudentProgress},
  record::FieldValues,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `POST /lesson-plans`
pub async fn create<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Json(body): Json<NewLessonPlan>,
) -> Result<impl IntoResponse, ApiError> {
  let plan = state.lesson_plans.create(body).await?;
  Ok((StatusCode::CREATED, Json(plan)))
}

/// `GET /lesson-plans/:id`
pub async fn get_one<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LessonPlan>, ApiError> {
  let plan = state
    .lesson_plans
    .get(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("lesson plan {id} not found")))?;
  Ok(Json(plan))
}

/// `PUT /lesson-plans/:id/values`
pub async fn edit<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(values): Json<FieldValues>,
) -> Result<Json<LessonPlan>, ApiError> {
  Ok(Json(state.lesson_plans.edit(id, values).await?))
}

/// `POST /lesson-plans/:id/submit`
pub async fn submit<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LessonPlan>, ApiError> {
  Ok(Json(state.lesson_plans.submit(id).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteBody {
  #[serde(default)]
  pub note: Option<String>,
}

/// `POST /lesson-plans/:id/approve`
pub async fn approve<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NoteBody>,
) -> Result<Json<LessonPlan>, ApiError> {
  Ok(Json(state.lesson_plans.approve(id, body.note).await?))
}

/// `POST /lesson-plans/:id/reject`
pub async fn reject<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NoteBody>,
) -> Result<Json<LessonPlan>, ApiError> {
  let note = body.note.unwrap_or_default();
  Ok(Json(state.lesson_plans.reject(id, &note).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct DuplicateBody {
  pub date: Option<NaiveDate>,
}

/// `POST /lesson-plans/:id/duplicate`
pub async fn duplicate<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(body): Json<DuplicateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let date = body.date.unwrap_or_else(|| Utc::now().date_naive());
  let plan = state.lesson_plans.duplicate(id, date).await?;
  Ok((StatusCode::CREATED, Json(plan)))
}

/// `POST /lesson-plans/:id/apply`
pub async fn apply<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<StudentProgress>>, ApiError> {
  Ok(Json(state.lesson_plans.apply_to_students(id).await?))
}

/// `GET /teachers/:tid/lesson-plans`
pub async fn for_teacher<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(teacher_id): Path<Uuid>,
) -> Result<Json<Vec<LessonPlan>>, ApiError> {
  Ok(Json(state.lesson_plans.list_for_teacher(teacher_id).await?))
}

/// `GET /students/:id/progress`
pub async fn progress<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<StudentProgress>>, ApiError> {
  Ok(Json(state.lesson_plans.progress_for_student(student_id).await?))
}
