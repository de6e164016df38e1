//! Error types for `hifz-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::lesson::LessonStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration name must not be empty")]
  EmptyName,

  #[error("{level} index {index} out of range")]
  IndexOutOfRange { level: &'static str, index: usize },

  #[error("configuration not found: {0}")]
  ConfigurationNotFound(Uuid),

  #[error("record not found: {0}")]
  RecordNotFound(Uuid),

  #[error("lesson plan not found: {0}")]
  LessonPlanNotFound(Uuid),

  #[error("teacher not found: {0}")]
  TeacherNotFound(Uuid),

  #[error("configuration {config} is not available to teacher {teacher}")]
  ConfigurationNotAvailable { config: Uuid, teacher: Uuid },

  #[error("unknown field {0:?}")]
  UnknownField(String),

  #[error("field {0:?} is filed under the wrong partition")]
  MisplacedField(String),

  #[error("record belongs to configuration {actual}, expected {expected}")]
  ConfigurationMismatch { expected: Uuid, actual: Uuid },

  #[error("identifier fields empty")]
  IncompleteIdentifiers,

  #[error("a record with the same identifiers already exists")]
  DuplicateIdentifiers,

  #[error(
    "cannot change recall identifier on field {0:?} while records exist"
  )]
  IdentifierToggleWithRecords(String),

  #[error("rejection requires a supervisor note")]
  EmptyRejectionNote,

  #[error("cannot {action} a lesson plan in status {from:?}")]
  InvalidTransition {
    from:   LessonStatus,
    action: &'static str,
  },

  #[error("lesson plan {0} is approved and read-only")]
  ReadOnly(Uuid),

  #[error("storage error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error from a [`KeyValueStore`](crate::kv::KeyValueStore).
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  /// Whether the error is a user-facing validation failure rather than a
  /// storage or lookup problem.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::EmptyName
        | Self::IndexOutOfRange { .. }
        | Self::IncompleteIdentifiers
        | Self::DuplicateIdentifiers
        | Self::IdentifierToggleWithRecords(_)
        | Self::EmptyRejectionNote
        | Self::ConfigurationMismatch { .. }
        | Self::ConfigurationNotAvailable { .. }
        | Self::UnknownField(_)
        | Self::MisplacedField(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
