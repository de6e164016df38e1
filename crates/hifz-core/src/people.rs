//! Teachers and students, as far as the study-plan engine needs them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown in place of a name when an ID does not resolve.
pub const UNKNOWN_NAME: &str = "غير معروف";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
  pub id:                Uuid,
  pub subscriber_id:     Uuid,
  pub name:              String,
  /// Decides which configurations the teacher may use.
  pub classification_id: Option<String>,
}

impl Teacher {
  pub fn new(
    subscriber_id: Uuid,
    name: impl Into<String>,
    classification_id: Option<String>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      subscriber_id,
      name: name.into(),
      classification_id,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:            Uuid,
  pub subscriber_id: Uuid,
  pub name:          String,
  pub halaqa_id:     Option<Uuid>,
}

impl Student {
  pub fn new(
    subscriber_id: Uuid,
    name: impl Into<String>,
    halaqa_id: Option<Uuid>,
  ) -> Self {
    Self { id: Uuid::new_v4(), subscriber_id, name: name.into(), halaqa_id }
  }
}
