//! Handlers for study-plan configurations and templates.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/templates` | Built-in templates |
//! | `POST` | `/subscribers/:sid/drafts` | Body: [`DraftBody`]; unsaved draft |
//! | `GET`  | `/subscribers/:sid/configurations` | |
//! | `POST` | `/subscribers/:sid/configurations` | Body: [`ConfigurationDraft`]; upsert; 404 for another subscriber's ID |
//! | `GET`  | `/configurations/:id` | 404 if not found |
//! | `DELETE` | `/configurations/:id` | Cascades to records |
//! | `POST` | `/configurations/:id/duplicate` | Returns 201 + copy |
//! | `GET`  | `/teachers/:tid/configurations` | By classification |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use hifz_core::{
  editor::apply_template,
  kv::KeyValueStore,
  schema::{ConfigurationDraft, StudyPlanConfiguration},
  template::{Template, builtin_templates, find_template},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Templates ────────────────────────────────────────────────────────────────

/// `GET /templates`
pub async fn templates() -> Json<Vec<Template>> { Json(builtin_templates()) }

#[derive(Debug, Deserialize)]
pub struct DraftBody {
  pub name:     String,
  /// Key of a built-in template; omitted for a blank draft.
  pub template: Option<String>,
}

/// `POST /subscribers/:sid/drafts` — start a draft, optionally from a
/// template. Nothing is stored.
pub async fn new_draft(
  Path(subscriber_id): Path<Uuid>,
  Json(body): Json<DraftBody>,
) -> Result<Json<ConfigurationDraft>, ApiError> {
  let template = body
    .template
    .as_deref()
    .map(|key| {
      find_template(key)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown template {key:?}")))
    })
    .transpose()?;
  Ok(Json(apply_template(subscriber_id, body.name, template.as_ref())))
}

// ─── List / save ──────────────────────────────────────────────────────────────

/// `GET /subscribers/:sid/configurations`
pub async fn list<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(subscriber_id): Path<Uuid>,
) -> Result<Json<Vec<StudyPlanConfiguration>>, ApiError> {
  let configs = state.study_plans.list_configurations(subscriber_id).await?;
  Ok(Json(configs))
}

/// `POST /subscribers/:sid/configurations` — upsert a draft. The path's
/// subscriber wins over the body's.
pub async fn save<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(subscriber_id): Path<Uuid>,
  Json(mut draft): Json<ConfigurationDraft>,
) -> Result<impl IntoResponse, ApiError> {
  draft.subscriber_id = subscriber_id;
  let inserted = draft.id.is_none();
  let config = state.study_plans.save_configuration(draft).await?;
  let status = if inserted { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(config)))
}

// ─── Single configuration ─────────────────────────────────────────────────────

/// `GET /configurations/:id`
pub async fn get_one<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StudyPlanConfiguration>, ApiError> {
  Ok(Json(state.study_plans.require_configuration(id).await?))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
  pub records_removed: usize,
}

/// `DELETE /configurations/:id`
pub async fn delete_one<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
  let records_removed = state.study_plans.delete_configuration(id).await?;
  Ok(Json(DeleteResponse { records_removed }))
}

/// `POST /configurations/:id/duplicate`
pub async fn duplicate<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let copy = state.study_plans.duplicate_configuration(id).await?;
  Ok((StatusCode::CREATED, Json(copy)))
}

/// `GET /teachers/:tid/configurations`
pub async fn for_teacher<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(teacher_id): Path<Uuid>,
) -> Result<Json<Vec<StudyPlanConfiguration>>, ApiError> {
  let configs = state.study_plans.configurations_for_teacher(teacher_id).await?;
  Ok(Json(configs))
}
