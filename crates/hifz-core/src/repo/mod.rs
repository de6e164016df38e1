//! Repositories over a [`KeyValueStore`].
//!
//! Each repository owns a handful of collection keys and serialises its own
//! read-modify-write cycles behind an async mutex. The whole collection is
//! rewritten on every mutation.

mod lesson_plan;
mod people;
mod study_plan;

use serde::{Serialize, de::DeserializeOwned};

pub use lesson_plan::LessonPlanRepository;
pub use people::PeopleRepository;
pub use study_plan::StudyPlanRepository;

use crate::{Error, Result, kv::KeyValueStore};

// ─── Collection keys ─────────────────────────────────────────────────────────

pub const STUDY_PLAN_CONFIGURATIONS: &str = "studyPlanConfigurations";
pub const STUDY_PLAN_DATA: &str = "studyPlanData";
pub const LESSON_PLANS: &str = "lessonPlans";
pub const STUDENT_PROGRESS: &str = "studentProgress";
pub const TEACHERS: &str = "teachers";
pub const STUDENTS: &str = "students";

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Read the collection stored under `key`; an unset key is an empty
/// collection.
pub(crate) async fn load<K, T>(kv: &K, key: &str) -> Result<Vec<T>>
where
  K: KeyValueStore,
  T: DeserializeOwned,
{
  match kv.get(key).await.map_err(Error::store)? {
    Some(raw) => Ok(serde_json::from_str(&raw)?),
    None => Ok(Vec::new()),
  }
}

/// Replace the collection stored under `key`.
pub(crate) async fn save<K, T>(kv: &K, key: &str, items: &[T]) -> Result<()>
where
  K: KeyValueStore,
  T: Serialize,
{
  let raw = serde_json::to_string(items)?;
  kv.set(key, raw).await.map_err(Error::store)
}
