//! Study-plan schema types.
//!
//! A configuration is a user-authored tree: groups contain sub-groups, which
//! contain fields. The depth-first concatenation of every field is the
//! schema's column order, shared by table rendering and bulk import.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, record::FieldValues};

/// Generate a fresh synthetic ID for a group, sub-group or field.
pub fn new_node_id() -> String { Uuid::new_v4().to_string() }

// ─── Tree nodes ──────────────────────────────────────────────────────────────

/// A single data-entry field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
  pub id:                   String,
  pub label:                String,
  /// Participates in the recall lookup key when `true`.
  pub is_recall_identifier: bool,
}

impl Field {
  pub fn new(label: impl Into<String>, is_recall_identifier: bool) -> Self {
    Self { id: new_node_id(), label: label.into(), is_recall_identifier }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGroup {
  pub id:     String,
  pub label:  String,
  pub fields: Vec<Field>,
}

impl SubGroup {
  pub fn new(label: impl Into<String>) -> Self {
    Self { id: new_node_id(), label: label.into(), fields: Vec::new() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:         String,
  pub label:      String,
  pub sub_groups: Vec<SubGroup>,
}

impl Group {
  pub fn new(label: impl Into<String>) -> Self {
    Self { id: new_node_id(), label: label.into(), sub_groups: Vec::new() }
  }

  /// Replace every synthetic ID in this subtree with a fresh one.
  pub fn regenerate_ids(&mut self) {
    self.id = new_node_id();
    for sub in &mut self.sub_groups {
      sub.id = new_node_id();
      for field in &mut sub.fields {
        field.id = new_node_id();
      }
    }
  }
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// A named, tenant-scoped schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlanConfiguration {
  pub id:                        Uuid,
  pub subscriber_id:             Uuid,
  pub name:                      String,
  /// Teacher classifications allowed to use this schema. Empty means no
  /// teacher may use it until one is assigned.
  pub target_classification_ids: BTreeSet<String>,
  pub groups:                    Vec<Group>,
}

impl StudyPlanConfiguration {
  /// Every field in column order.
  pub fn fields(&self) -> Vec<&Field> { flatten_fields(&self.groups) }

  pub fn identifier_fields(&self) -> Vec<&Field> {
    self.fields().into_iter().filter(|f| f.is_recall_identifier).collect()
  }

  pub fn data_fields(&self) -> Vec<&Field> {
    self.fields().into_iter().filter(|f| !f.is_recall_identifier).collect()
  }

  pub fn field(&self, field_id: &str) -> Option<&Field> {
    self.fields().into_iter().find(|f| f.id == field_id)
  }

  /// Refuse any key of `values` that is not a field of this schema.
  pub fn check_field_ids(&self, values: &FieldValues) -> Result<()> {
    match values.keys().find(|id| self.field(id).is_none()) {
      Some(id) => Err(Error::UnknownField(id.clone())),
      None => Ok(()),
    }
  }

  /// Whether a teacher with `classification_id` may use this schema.
  pub fn is_available_to(&self, classification_id: Option<&str>) -> bool {
    classification_id
      .is_some_and(|c| self.target_classification_ids.contains(c))
  }

  /// Convert back into an editable draft that will upsert onto this ID.
  pub fn to_draft(&self) -> ConfigurationDraft {
    ConfigurationDraft {
      id:                        Some(self.id),
      subscriber_id:             self.subscriber_id,
      name:                      self.name.clone(),
      target_classification_ids: self.target_classification_ids.clone(),
      groups:                    self.groups.clone(),
    }
  }
}

/// Depth-first flattening: groups, then sub-groups, then fields, each in
/// insertion order.
pub fn flatten_fields(groups: &[Group]) -> Vec<&Field> {
  groups
    .iter()
    .flat_map(|g| g.sub_groups.iter())
    .flat_map(|s| s.fields.iter())
    .collect()
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// An in-memory configuration being edited. Nothing is persisted until it is
/// passed to [`StudyPlanRepository::save_configuration`].
///
/// `id` is `None` for a configuration that has never been saved.
///
/// [`StudyPlanRepository::save_configuration`]:
///   crate::repo::StudyPlanRepository::save_configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDraft {
  #[serde(default)]
  pub id:                        Option<Uuid>,
  pub subscriber_id:             Uuid,
  pub name:                      String,
  #[serde(default)]
  pub target_classification_ids: BTreeSet<String>,
  #[serde(default)]
  pub groups:                    Vec<Group>,
}

impl ConfigurationDraft {
  /// A blank, unsaved draft.
  pub fn new(subscriber_id: Uuid, name: impl Into<String>) -> Self {
    Self {
      id: None,
      subscriber_id,
      name: name.into(),
      target_classification_ids: BTreeSet::new(),
      groups: Vec::new(),
    }
  }

  pub fn fields(&self) -> Vec<&Field> { flatten_fields(&self.groups) }
}
