//! [`StudyPlanRepository`] — configurations and their recall database.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;
use uuid::Uuid;

use super::{STUDY_PLAN_CONFIGURATIONS, STUDY_PLAN_DATA, TEACHERS, load, save};
use crate::{
  Error, Result, editor, import,
  import::ImportReport,
  kv::KeyValueStore,
  people::Teacher,
  recall,
  record::{FieldValues, StudyPlanDataRecord},
  schema::{ConfigurationDraft, StudyPlanConfiguration},
};

/// Study-plan configurations and their data records, persisted under
/// [`STUDY_PLAN_CONFIGURATIONS`] and [`STUDY_PLAN_DATA`].
pub struct StudyPlanRepository<K> {
  kv:   K,
  lock: Mutex<()>,
}

/// Refuse records that cannot be recalled or that collide with each other.
///
/// Every identifier value must sit under an identifier field and every data
/// value under a data field.
fn validate_records(
  config: &StudyPlanConfiguration,
  records: &[StudyPlanDataRecord],
) -> Result<()> {
  let partition: HashMap<&str, bool> = config
    .fields()
    .into_iter()
    .map(|f| (f.id.as_str(), f.is_recall_identifier))
    .collect();
  let check = |values: &FieldValues, identifier: bool| -> Result<()> {
    for field_id in values.keys() {
      match partition.get(field_id.as_str()) {
        None => return Err(Error::UnknownField(field_id.clone())),
        Some(is_identifier) if *is_identifier != identifier => {
          return Err(Error::MisplacedField(field_id.clone()));
        }
        Some(_) => {}
      }
    }
    Ok(())
  };

  let identifier_fields = config.identifier_fields();
  let mut seen = HashSet::new();
  for record in records {
    if record.plan_config_id != config.id {
      return Err(Error::ConfigurationMismatch {
        expected: config.id,
        actual:   record.plan_config_id,
      });
    }
    check(&record.recall_identifiers, true)?;
    check(&record.data, false)?;

    let key = record
      .identifier_key(&identifier_fields)
      .ok_or(Error::IncompleteIdentifiers)?;
    if !identifier_fields.is_empty() && !seen.insert(key) {
      return Err(Error::DuplicateIdentifiers);
    }
  }
  Ok(())
}

/// The first field whose identifier flag differs between `old` and `new`.
fn toggled_identifier(
  old: &StudyPlanConfiguration,
  new: &ConfigurationDraft,
) -> Option<String> {
  let before: HashMap<&str, bool> = old
    .fields()
    .into_iter()
    .map(|f| (f.id.as_str(), f.is_recall_identifier))
    .collect();
  new
    .fields()
    .into_iter()
    .find(|f| {
      before
        .get(f.id.as_str())
        .is_some_and(|was| *was != f.is_recall_identifier)
    })
    .map(|f| f.id.clone())
}

impl<K: KeyValueStore> StudyPlanRepository<K> {
  pub fn new(kv: K) -> Self { Self { kv, lock: Mutex::new(()) } }

  async fn configurations(&self) -> Result<Vec<StudyPlanConfiguration>> {
    load(&self.kv, STUDY_PLAN_CONFIGURATIONS).await
  }

  async fn records(&self) -> Result<Vec<StudyPlanDataRecord>> {
    load(&self.kv, STUDY_PLAN_DATA).await
  }

  // ── Configurations ────────────────────────────────────────────────────────

  /// All configurations owned by `subscriber_id`, in storage order.
  pub async fn list_configurations(
    &self,
    subscriber_id: Uuid,
  ) -> Result<Vec<StudyPlanConfiguration>> {
    let mut configs = self.configurations().await?;
    configs.retain(|c| c.subscriber_id == subscriber_id);
    Ok(configs)
  }

  pub async fn get_configuration(
    &self,
    id: Uuid,
  ) -> Result<Option<StudyPlanConfiguration>> {
    Ok(self.configurations().await?.into_iter().find(|c| c.id == id))
  }

  pub async fn require_configuration(
    &self,
    id: Uuid,
  ) -> Result<StudyPlanConfiguration> {
    self
      .get_configuration(id)
      .await?
      .ok_or(Error::ConfigurationNotFound(id))
  }

  /// Configurations the teacher's classification makes available. Unknown
  /// teachers get none.
  pub async fn configurations_for_teacher(
    &self,
    teacher_id: Uuid,
  ) -> Result<Vec<StudyPlanConfiguration>> {
    let teachers: Vec<Teacher> = load(&self.kv, TEACHERS).await?;
    let Some(teacher) = teachers.into_iter().find(|t| t.id == teacher_id)
    else {
      return Ok(Vec::new());
    };
    let mut configs = self.list_configurations(teacher.subscriber_id).await?;
    configs.retain(|c| c.is_available_to(teacher.classification_id.as_deref()));
    Ok(configs)
  }

  /// Upsert `draft`. A draft without an ID is inserted under a fresh one.
  ///
  /// Refuses an empty name, and refuses flipping a field's recall-identifier
  /// flag while the configuration has records. An ID owned by another
  /// subscriber is reported as not found.
  pub async fn save_configuration(
    &self,
    draft: ConfigurationDraft,
  ) -> Result<StudyPlanConfiguration> {
    let name = draft.name.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }

    let _guard = self.lock.lock().await;
    let mut configs = self.configurations().await?;
    let id = draft.id.unwrap_or_else(Uuid::new_v4);
    let position = configs.iter().position(|c| c.id == id);
    if position.is_some_and(|i| configs[i].subscriber_id != draft.subscriber_id)
    {
      return Err(Error::ConfigurationNotFound(id));
    }

    if let Some(existing) = position.map(|i| &configs[i])
      && let Some(field_id) = toggled_identifier(existing, &draft)
    {
      let records = self.records().await?;
      if records.iter().any(|r| r.plan_config_id == id) {
        return Err(Error::IdentifierToggleWithRecords(field_id));
      }
    }

    let config = StudyPlanConfiguration {
      id,
      subscriber_id: draft.subscriber_id,
      name: name.to_owned(),
      target_classification_ids: draft.target_classification_ids,
      groups: draft.groups,
    };

    match position {
      Some(i) => configs[i] = config.clone(),
      None => configs.push(config.clone()),
    }
    save(&self.kv, STUDY_PLAN_CONFIGURATIONS, &configs).await?;

    tracing::info!(
      config_id = %config.id,
      inserted = position.is_none(),
      "saved study-plan configuration"
    );
    Ok(config)
  }

  /// Copy a configuration under a new ID with a suffixed name. Records are
  /// not copied.
  pub async fn duplicate_configuration(
    &self,
    id: Uuid,
  ) -> Result<StudyPlanConfiguration> {
    let source = self.require_configuration(id).await?;
    self
      .save_configuration(editor::duplicate_configuration(&source))
      .await
  }

  /// Delete a configuration and every record that belongs to it. Returns the
  /// number of records removed.
  pub async fn delete_configuration(&self, id: Uuid) -> Result<usize> {
    let _guard = self.lock.lock().await;
    let mut configs = self.configurations().await?;
    let before = configs.len();
    configs.retain(|c| c.id != id);
    if configs.len() == before {
      return Err(Error::ConfigurationNotFound(id));
    }

    let mut records = self.records().await?;
    let records_before = records.len();
    records.retain(|r| r.plan_config_id != id);
    let removed = records_before - records.len();

    save(&self.kv, STUDY_PLAN_DATA, &records).await?;
    save(&self.kv, STUDY_PLAN_CONFIGURATIONS, &configs).await?;

    tracing::info!(config_id = %id, records_removed = removed, "deleted study-plan configuration");
    Ok(removed)
  }

  // ── Records ───────────────────────────────────────────────────────────────

  pub async fn list_records(
    &self,
    plan_config_id: Uuid,
  ) -> Result<Vec<StudyPlanDataRecord>> {
    let mut records = self.records().await?;
    records.retain(|r| r.plan_config_id == plan_config_id);
    Ok(records)
  }

  /// Insert one record built from a flat field → value map.
  pub async fn add_record(
    &self,
    plan_config_id: Uuid,
    values: &FieldValues,
  ) -> Result<StudyPlanDataRecord> {
    let _guard = self.lock.lock().await;
    let config = self.require_configuration(plan_config_id).await?;
    let record = StudyPlanDataRecord::from_values(&config, values);

    let mut records = self.records().await?;
    let mut scoped: Vec<StudyPlanDataRecord> = records
      .iter()
      .filter(|r| r.plan_config_id == plan_config_id)
      .cloned()
      .collect();
    scoped.push(record.clone());
    validate_records(&config, &scoped)?;

    records.push(record.clone());
    save(&self.kv, STUDY_PLAN_DATA, &records).await?;
    tracing::debug!(config_id = %plan_config_id, record_id = %record.id, "added record");
    Ok(record)
  }

  /// Overwrite an existing record in place. The record must already belong
  /// to `record.plan_config_id`; records never move between configurations.
  pub async fn update_record(
    &self,
    record: StudyPlanDataRecord,
  ) -> Result<StudyPlanDataRecord> {
    let _guard = self.lock.lock().await;
    let config = self.require_configuration(record.plan_config_id).await?;

    let mut records = self.records().await?;
    let position = records
      .iter()
      .position(|r| r.id == record.id && r.plan_config_id == config.id)
      .ok_or(Error::RecordNotFound(record.id))?;
    records[position] = record.clone();

    let scoped: Vec<StudyPlanDataRecord> = records
      .iter()
      .filter(|r| r.plan_config_id == config.id)
      .cloned()
      .collect();
    validate_records(&config, &scoped)?;

    save(&self.kv, STUDY_PLAN_DATA, &records).await?;
    Ok(record)
  }

  pub async fn delete_record(
    &self,
    plan_config_id: Uuid,
    record_id: Uuid,
  ) -> Result<()> {
    let _guard = self.lock.lock().await;
    let mut records = self.records().await?;
    let before = records.len();
    records.retain(|r| !(r.id == record_id && r.plan_config_id == plan_config_id));
    if records.len() == before {
      return Err(Error::RecordNotFound(record_id));
    }
    save(&self.kv, STUDY_PLAN_DATA, &records).await
  }

  /// Save a whole working set: the configuration's records become exactly
  /// `working_set`. Records of other configurations are untouched.
  pub async fn replace_records(
    &self,
    plan_config_id: Uuid,
    working_set: Vec<StudyPlanDataRecord>,
  ) -> Result<Vec<StudyPlanDataRecord>> {
    let _guard = self.lock.lock().await;
    let config = self.require_configuration(plan_config_id).await?;
    validate_records(&config, &working_set)?;

    let mut records = self.records().await?;
    records.retain(|r| r.plan_config_id != plan_config_id);
    records.extend(working_set.iter().cloned());
    save(&self.kv, STUDY_PLAN_DATA, &records).await?;

    tracing::info!(
      config_id = %plan_config_id,
      records = working_set.len(),
      "replaced recall records"
    );
    Ok(working_set)
  }

  // ── Recall ────────────────────────────────────────────────────────────────

  /// The stored record whose identifiers match `candidate`, if any.
  pub async fn find_match(
    &self,
    plan_config_id: Uuid,
    candidate: &FieldValues,
  ) -> Result<Option<StudyPlanDataRecord>> {
    let config = self.require_configuration(plan_config_id).await?;
    let records = self.records().await?;
    Ok(recall::find_match(&config, candidate, &records).cloned())
  }

  pub async fn unique_values_for_field(
    &self,
    plan_config_id: Uuid,
    field_id: &str,
  ) -> Result<Vec<String>> {
    let records = self.records().await?;
    Ok(recall::unique_values_for_field(plan_config_id, field_id, &records))
  }

  /// Parse pasted rows against the configuration's current records. Nothing
  /// is persisted; pass the accepted rows to [`Self::replace_records`]
  /// together with the existing ones to save them.
  pub async fn preview_import(
    &self,
    plan_config_id: Uuid,
    text: &str,
  ) -> Result<ImportReport> {
    let config = self.require_configuration(plan_config_id).await?;
    let existing = self.list_records(plan_config_id).await?;
    let report = import::parse(&config, text, &existing);
    tracing::debug!(
      config_id = %plan_config_id,
      accepted = report.accepted.len(),
      failed = report.failed.len(),
      "parsed bulk import"
    );
    Ok(report)
  }
}
