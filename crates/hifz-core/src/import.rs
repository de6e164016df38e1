//! Tab-delimited bulk import into the recall database.
//!
//! Pipeline:
//!   pasted text
//!     └─ non-blank lines, split on `\t`
//!          └─ zip columns with the depth-first field order
//!               └─ route values into identifiers / data
//!                    └─ ImportReport { accepted, failed }
//!
//! Nothing here touches storage: accepted rows form a working set the caller
//! saves explicitly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
  record::{FieldValues, StudyPlanDataRecord},
  schema::StudyPlanConfiguration,
};

pub const REASON_IDENTIFIERS_EMPTY: &str = "identifier fields empty";
pub const REASON_DUPLICATE: &str = "duplicate identifiers";

/// A line that could not be imported, reported verbatim so it can be fixed
/// and pasted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
  pub raw_line: String,
  pub reason:   String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
  pub accepted: Vec<StudyPlanDataRecord>,
  pub failed:   Vec<ImportFailure>,
}

impl ImportReport {
  pub fn is_clean(&self) -> bool { self.failed.is_empty() }
}

fn column_mismatch(expected: usize, got: usize) -> String {
  format!("column count mismatch, expected {expected} got {got}")
}

/// Parse `text` into records for `config`.
///
/// `existing` holds the records already in the working set; rows whose
/// identifier tuple collides with one of them, or with an earlier row of the
/// same paste, are rejected.
pub fn parse(
  config: &StudyPlanConfiguration,
  text: &str,
  existing: &[StudyPlanDataRecord],
) -> ImportReport {
  let fields = config.fields();
  let identifier_fields = config.identifier_fields();

  let mut seen: HashSet<Vec<String>> = existing
    .iter()
    .filter(|r| r.plan_config_id == config.id)
    .filter_map(|r| r.identifier_key(&identifier_fields))
    .collect();

  let mut report = ImportReport::default();

  for raw in text.lines() {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if line.trim().is_empty() {
      continue;
    }

    let fail = |reason: String| ImportFailure {
      raw_line: line.to_owned(),
      reason,
    };

    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != fields.len() {
      report
        .failed
        .push(fail(column_mismatch(fields.len(), columns.len())));
      continue;
    }

    let mut recall_identifiers = FieldValues::new();
    let mut data = FieldValues::new();
    for (field, column) in fields.iter().zip(&columns) {
      let value = column.trim().to_owned();
      if field.is_recall_identifier {
        recall_identifiers.insert(field.id.clone(), value);
      } else {
        data.insert(field.id.clone(), value);
      }
    }

    let record = StudyPlanDataRecord::new(config.id, recall_identifiers, data);
    let Some(key) = record.identifier_key(&identifier_fields) else {
      report.failed.push(fail(REASON_IDENTIFIERS_EMPTY.to_owned()));
      continue;
    };
    if !identifier_fields.is_empty() && !seen.insert(key) {
      report.failed.push(fail(REASON_DUPLICATE.to_owned()));
      continue;
    }

    report.accepted.push(record);
  }

  report
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;
  use crate::{editor::apply_template, template};

  /// Memorization template: surah, from, to (identifiers) then rating,
  /// mistakes, notes (data).
  fn config() -> StudyPlanConfiguration {
    let draft =
      apply_template(Uuid::new_v4(), "حفظ", Some(&template::memorization()));
    StudyPlanConfiguration {
      id:                        Uuid::new_v4(),
      subscriber_id:             draft.subscriber_id,
      name:                      draft.name,
      target_classification_ids: draft.target_classification_ids,
      groups:                    draft.groups,
    }
  }

  #[test]
  fn accepts_well_formed_rows_in_column_order() {
    let config = config();
    let text = "البقرة\t1\t5\tممتاز\t0\t\n\nالبقرة\t6\t10\tجيد\t2\tتكرار\n";
    let report = parse(&config, text, &[]);

    assert!(report.is_clean(), "{:?}", report.failed);
    assert_eq!(report.accepted.len(), 2);

    let fields = config.fields();
    let first = &report.accepted[0];
    assert_eq!(first.plan_config_id, config.id);
    assert_eq!(first.recall_identifiers.len(), 3);
    assert_eq!(first.value(&fields[0].id), Some("البقرة"));
    assert_eq!(first.value(&fields[2].id), Some("5"));
    assert_eq!(first.data.get(&fields[3].id).map(String::as_str), Some("ممتاز"));
    assert_eq!(first.data.get(&fields[5].id).map(String::as_str), Some(""));
  }

  #[test]
  fn column_count_mismatch_is_rejected() {
    let config = config();
    let line = "البقرة\t1\t5\tممتاز\t0";
    let report = parse(&config, line, &[]);

    assert!(report.accepted.is_empty());
    assert_eq!(report.failed, vec![ImportFailure {
      raw_line: line.into(),
      reason:   "column count mismatch, expected 6 got 5".into(),
    }]);
  }

  #[test]
  fn blank_identifier_is_rejected_even_with_full_columns() {
    let config = config();
    let line = "البقرة\t \t5\tممتاز\t0\tملاحظة";
    let report = parse(&config, line, &[]);

    assert!(report.accepted.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].reason, REASON_IDENTIFIERS_EMPTY);
    assert_eq!(report.failed[0].raw_line, line);
  }

  #[test]
  fn duplicate_tuples_are_rejected_against_paste_and_existing() {
    let config = config();
    let existing =
      parse(&config, "الفاتحة\t1\t7\tممتاز\t0\t", &[]).accepted;
    let text = "البقرة\t1\t5\tممتاز\t0\t\n\
                البقرة \t1\t5\tجيد\t1\t\n\
                الفاتحة\t1\t7\tجيد\t1\t";
    let report = parse(&config, text, &existing);

    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.iter().all(|f| f.reason == REASON_DUPLICATE));
  }

  #[test]
  fn failures_do_not_block_other_rows() {
    let config = config();
    let text = "bad line\nالبقرة\t1\t5\tممتاز\t0\t\r\n";
    let report = parse(&config, text, &[]);
    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].raw_line, "bad line");
  }
}
