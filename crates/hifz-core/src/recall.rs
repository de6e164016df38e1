//! Recall lookup: find the historical record whose identifier values match a
//! partially-filled form.

use std::collections::BTreeSet;

use crate::{
  record::{FieldValues, StudyPlanDataRecord, normalize},
  schema::StudyPlanConfiguration,
};

/// Return the first record of `config` whose identifier values equal
/// `candidate` after trimming and lowercasing.
///
/// Returns `None` when any identifier field of `config` is missing or blank
/// in `candidate`. Records whose identifier count differs from the
/// candidate's are never matched.
pub fn find_match<'a, I>(
  config: &StudyPlanConfiguration,
  candidate: &FieldValues,
  records: I,
) -> Option<&'a StudyPlanDataRecord>
where
  I: IntoIterator<Item = &'a StudyPlanDataRecord>,
{
  let identifier_fields = config.identifier_fields();
  if identifier_fields.is_empty() {
    return None;
  }

  let wanted: Vec<(&str, String)> = identifier_fields
    .iter()
    .map(|f| {
      candidate
        .get(&f.id)
        .map(|v| normalize(v))
        .filter(|v| !v.is_empty())
        .map(|v| (f.id.as_str(), v))
    })
    .collect::<Option<_>>()?;

  records.into_iter().find(|record| {
    record.plan_config_id == config.id
      && record.recall_identifiers.len() == candidate.len()
      && wanted.iter().all(|(field_id, value)| {
        record
          .recall_identifiers
          .get(*field_id)
          .is_some_and(|stored| normalize(stored) == *value)
      })
  })
}

/// Sorted distinct non-empty values stored for `field_id` across the records
/// of `plan_config_id`.
pub fn unique_values_for_field<'a, I>(
  plan_config_id: uuid::Uuid,
  field_id: &str,
  records: I,
) -> Vec<String>
where
  I: IntoIterator<Item = &'a StudyPlanDataRecord>,
{
  records
    .into_iter()
    .filter(|r| r.plan_config_id == plan_config_id)
    .filter_map(|r| r.value(field_id))
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_owned)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}
