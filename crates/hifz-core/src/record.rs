//! Rows of the recall database.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{Field, StudyPlanConfiguration};

/// Field ID → entered value. Ordered so serialised output is stable.
pub type FieldValues = BTreeMap<String, String>;

/// One row of historical values for a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlanDataRecord {
  pub id:                 Uuid,
  pub plan_config_id:     Uuid,
  /// Values for identifier fields; every identifier field must be present
  /// and non-empty for the record to be matchable.
  pub recall_identifiers: FieldValues,
  /// Values for the remaining fields.
  pub data:               FieldValues,
}

impl StudyPlanDataRecord {
  pub fn new(
    plan_config_id: Uuid,
    recall_identifiers: FieldValues,
    data: FieldValues,
  ) -> Self {
    Self { id: Uuid::new_v4(), plan_config_id, recall_identifiers, data }
  }

  /// The stored value for `field_id` in either partition.
  pub fn value(&self, field_id: &str) -> Option<&str> {
    self
      .recall_identifiers
      .get(field_id)
      .or_else(|| self.data.get(field_id))
      .map(String::as_str)
  }

  /// The normalised identifier tuple in `identifier_fields` order, or `None`
  /// if any identifier is missing or blank.
  pub fn identifier_key(
    &self,
    identifier_fields: &[&Field],
  ) -> Option<Vec<String>> {
    identifier_key(&self.recall_identifiers, identifier_fields)
  }

  /// Split a flat field → value map into identifier and data partitions
  /// according to `config`. Values for unknown field IDs are dropped.
  pub fn from_values(
    config: &StudyPlanConfiguration,
    values: &FieldValues,
  ) -> Self {
    let mut recall_identifiers = FieldValues::new();
    let mut data = FieldValues::new();
    for field in config.fields() {
      let Some(value) = values.get(&field.id) else { continue };
      let value = value.trim().to_owned();
      if field.is_recall_identifier {
        recall_identifiers.insert(field.id.clone(), value);
      } else {
        data.insert(field.id.clone(), value);
      }
    }
    Self::new(config.id, recall_identifiers, data)
  }
}

/// Case-insensitive, whitespace-trimmed form used for identifier comparison.
pub fn normalize(value: &str) -> String { value.trim().to_lowercase() }

/// Normalised values of `identifier_fields` taken from `values`, or `None`
/// when any of them is absent or blank after trimming.
pub fn identifier_key(
  values: &FieldValues,
  identifier_fields: &[&Field],
) -> Option<Vec<String>> {
  identifier_fields
    .iter()
    .map(|f| {
      values
        .get(&f.id)
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
    })
    .collect()
}
