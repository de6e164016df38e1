//! Handlers for the recall database of one configuration.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/configurations/:id/records` | |
//! | `POST` | `/configurations/:id/records` | Body: field id → value; returns 201 |
//! | `PUT`  | `/configurations/:id/records` | Body: full working set |
//! | `PUT`  | `/configurations/:id/records/:rid` | Body: record; 404 unless `rid` belongs to `id` |
//! | `DELETE` | `/configurations/:id/records/:rid` | |
//! | `POST` | `/configurations/:id/lookup` | Body: field id → value; `null` if no match |
//! | `GET`  | `/configurations/:id/fields/:fid/values` | Distinct values |
//! | `POST` | `/configurations/:id/import` | Body: [`ImportBody`]; preview only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use hifz_core::{
  import::ImportReport,
  kv::KeyValueStore,
  record::{FieldValues, StudyPlanDataRecord},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `GET /configurations/:id/records`
pub async fn list<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<StudyPlanDataRecord>>, ApiError> {
  state.study_plans.require_configuration(id).await?;
  Ok(Json(state.study_plans.list_records(id).await?))
}

/// `POST /configurations/:id/records`
pub async fn create<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(values): Json<FieldValues>,
) -> Result<impl IntoResponse, ApiError> {
  let record = state.study_plans.add_record(id, &values).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

/// `PUT /configurations/:id/records` — replace the configuration's records
/// with the posted working set.
pub async fn replace<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(working_set): Json<Vec<StudyPlanDataRecord>>,
) -> Result<Json<Vec<StudyPlanDataRecord>>, ApiError> {
  Ok(Json(state.study_plans.replace_records(id, working_set).await?))
}

/// `PUT /configurations/:id/records/:rid`
pub async fn update<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path((id, record_id)): Path<(Uuid, Uuid)>,
  Json(mut record): Json<StudyPlanDataRecord>,
) -> Result<Json<StudyPlanDataRecord>, ApiError> {
  record.id = record_id;
  record.plan_config_id = id;
  Ok(Json(state.study_plans.update_record(record).await?))
}

/// `DELETE /configurations/:id/records/:rid`
pub async fn delete_one<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path((id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
  state.study_plans.delete_record(id, record_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /configurations/:id/lookup`
pub async fn lookup<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(candidate): Json<FieldValues>,
) -> Result<Json<Option<StudyPlanDataRecord>>, ApiError> {
  Ok(Json(state.study_plans.find_match(id, &candidate).await?))
}

/// `GET /configurations/:id/fields/:fid/values`
pub async fn unique_values<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path((id, field_id)): Path<(Uuid, String)>,
) -> Result<Json<Vec<String>>, ApiError> {
  let values = state
    .study_plans
    .unique_values_for_field(id, &field_id)
    .await?;
  Ok(Json(values))
}

#[derive(Debug, Deserialize)]
pub struct ImportBody {
  /// Tab-separated rows in the configuration's column order.
  pub text: String,
}

/// `POST /configurations/:id/import`
pub async fn import<K: KeyValueStore>(
  State(state): State<AppState<K>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ImportBody>,
) -> Result<Json<ImportReport>, ApiError> {
  Ok(Json(state.study_plans.preview_import(id, &body.text).await?))
}
