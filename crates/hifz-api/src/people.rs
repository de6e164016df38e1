//! Handlers for teachers and students.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subscribers/:sid/teachers` | |
//! | `POST` | `/subscribers/:sid/teachers` | Body: [`TeacherBody`] |
//! | `GET`  | `/subscribers/:sid/students` | |
//! | `POST` | `/subscribers/:sid/students` | Body: [`StudentBody`] |
//! | `GET`  | `/teachers/:tid` | 404 if not found |
//! | `GET`  | `/halaqat/:hid/students` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use hifz_core::{
  kv::KeyValueStore,
  people::{Student, Teacher},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TeacherBody {
  pub name:              String,
  pub classification_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StudentBody {
  pub name:      String,
  pub halaqa_id: Option<Uuid>,
}

/// `GET /subscribers/:sid/teachers`
pub async fn list_teachers<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(subscriber_id): Path<Uuid>,
) -> Result<Json<Vec<Teacher>>, ApiError> {
  Ok(Json(state.people.list_teachers(subscriber_id).await?))
}

/// `POST /subscribers/:sid/teachers`
pub async fn create_teacher<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(subscriber_id): Path<Uuid>,
  Json(body): Json<TeacherBody>,
) -> Result<impl IntoResponse, ApiError> {
  let teacher = state
    .people
    .upsert_teacher(Teacher::new(
      subscriber_id,
      body.name,
      body.classification_id,
    ))
    .await?;
  Ok((StatusCode::CREATED, Json(teacher)))
}

/// `GET /teachers/:tid`
pub async fn get_teacher<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(teacher_id): Path<Uuid>,
) -> Result<Json<Teacher>, ApiError> {
  let teacher = state
    .people
    .get_teacher(teacher_id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("teacher {teacher_id} not found")))?;
  Ok(Json(teacher))
}

/// `GET /subscribers/:sid/students`
pub async fn list_students<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(subscriber_id): Path<Uuid>,
) -> Result<Json<Vec<Student>>, ApiError> {
  Ok(Json(state.people.list_students(subscriber_id).await?))
}

/// `POST /subscribers/:sid/students`
pub async fn create_student<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(subscriber_id): Path<Uuid>,
  Json(body): Json<StudentBody>,
) -> Result<impl IntoResponse, ApiError> {
  let student = state
    .people
    .upsert_student(Student::new(subscriber_id, body.name, body.halaqa_id))
    .await?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /halaqat/:hid/students`
pub async fn halaqa_students<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(halaqa_id): Path<Uuid>,
) -> Result<Json<Vec<Student>>, ApiError> {
  Ok(Json(state.people.students_in_halaqa(halaqa_id).await?))
}
