//! Daily lesson plans and their approval workflow.
//!
//! ```text
//! draft ──submit──▶ pending ──approve──▶ approved
//!   ▲                  │
//!   │               reject (note required)
//!   │                  ▼
//!   └────edit────── rejected
//! ```
//!
//! An approved plan is read-only but can be duplicated into a fresh draft.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, people::Student, record::FieldValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
  Draft,
  Pending,
  Approved,
  Rejected,
}

/// A teacher's plan for one halaqa on one date, filled in against a
/// study-plan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPlan {
  pub id:              Uuid,
  pub subscriber_id:   Uuid,
  pub teacher_id:      Uuid,
  pub halaqa_id:       Uuid,
  pub plan_config_id:  Uuid,
  pub date:            NaiveDate,
  pub status:          LessonStatus,
  /// Field ID → value, keyed by the configuration's fields.
  pub values:          FieldValues,
  pub supervisor_note: Option<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Input to [`crate::repo::LessonPlanRepository::create`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLessonPlan {
  pub subscriber_id:  Uuid,
  pub teacher_id:     Uuid,
  pub halaqa_id:      Uuid,
  pub plan_config_id: Uuid,
  pub date:           NaiveDate,
  #[serde(default)]
  pub values:         FieldValues,
}

impl LessonPlan {
  pub fn new(input: NewLessonPlan) -> Self {
    let now = Utc::now();
    Self {
      id:              Uuid::new_v4(),
      subscriber_id:   input.subscriber_id,
      teacher_id:      input.teacher_id,
      halaqa_id:       input.halaqa_id,
      plan_config_id:  input.plan_config_id,
      date:            input.date,
      status:          LessonStatus::Draft,
      values:          input.values,
      supervisor_note: None,
      created_at:      now,
      updated_at:      now,
    }
  }

  fn touch(&mut self) { self.updated_at = Utc::now(); }

  fn invalid(&self, action: &'static str) -> Error {
    Error::InvalidTransition { from: self.status, action }
  }

  /// Replace the plan's values. Editing a rejected or pending plan returns it
  /// to draft; approved plans are read-only.
  pub fn edit(&mut self, values: FieldValues) -> Result<()> {
    if self.status == LessonStatus::Approved {
      return Err(Error::ReadOnly(self.id));
    }
    self.values = values;
    self.status = LessonStatus::Draft;
    self.touch();
    Ok(())
  }

  pub fn submit(&mut self) -> Result<()> {
    if self.status != LessonStatus::Draft {
      return Err(self.invalid("submit"));
    }
    self.status = LessonStatus::Pending;
    self.touch();
    Ok(())
  }

  pub fn approve(&mut self, note: Option<String>) -> Result<()> {
    if self.status != LessonStatus::Pending {
      return Err(self.invalid("approve"));
    }
    self.status = LessonStatus::Approved;
    self.supervisor_note =
      note.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
    self.touch();
    Ok(())
  }

  pub fn reject(&mut self, note: &str) -> Result<()> {
    if self.status != LessonStatus::Pending {
      return Err(self.invalid("reject"));
    }
    let note = note.trim();
    if note.is_empty() {
      return Err(Error::EmptyRejectionNote);
    }
    self.status = LessonStatus::Rejected;
    self.supervisor_note = Some(note.to_owned());
    self.touch();
    Ok(())
  }

  /// A fresh draft for `date` carrying this plan's values forward.
  pub fn duplicate_for(&self, date: NaiveDate) -> Self {
    let mut copy = Self::new(NewLessonPlan {
      subscriber_id:  self.subscriber_id,
      teacher_id:     self.teacher_id,
      halaqa_id:      self.halaqa_id,
      plan_config_id: self.plan_config_id,
      date,
      values:         self.values.clone(),
    });
    copy.supervisor_note = None;
    copy
  }

  /// Progress entries for every student enrolled in this plan's halaqa.
  /// Allowed in any status.
  pub fn progress_for<'a, I>(&self, students: I) -> Vec<StudentProgress>
  where
    I: IntoIterator<Item = &'a Student>,
  {
    students
      .into_iter()
      .filter(|s| s.halaqa_id == Some(self.halaqa_id))
      .map(|s| StudentProgress {
        id:             Uuid::new_v4(),
        student_id:     s.id,
        lesson_plan_id: self.id,
        plan_config_id: self.plan_config_id,
        date:           self.date,
        values:         self.values.clone(),
      })
      .collect()
  }
}

/// A student's daily progress entry, one per student, date and
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProgress {
  pub id:             Uuid,
  pub student_id:     Uuid,
  pub lesson_plan_id: Uuid,
  pub plan_config_id: Uuid,
  pub date:           NaiveDate,
  pub values:         FieldValues,
}

impl StudentProgress {
  /// Whether `other` occupies the same (student, date, configuration) slot.
  pub fn same_slot(&self, other: &Self) -> bool {
    self.student_id == other.student_id
      && self.date == other.date
      && self.plan_config_id == other.plan_config_id
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, 10, d).unwrap() }

  fn plan() -> LessonPlan {
    let mut values = FieldValues::new();
    values.insert("surah".into(), "البقرة".into());
    LessonPlan::new(NewLessonPlan {
      subscriber_id: Uuid::new_v4(),
      teacher_id: Uuid::new_v4(),
      halaqa_id: Uuid::new_v4(),
      plan_config_id: Uuid::new_v4(),
      date: date(1),
      values,
    })
  }

  #[test]
  fn happy_path_to_approval() {
    let mut p = plan();
    assert_eq!(p.status, LessonStatus::Draft);
    p.submit().unwrap();
    assert_eq!(p.status, LessonStatus::Pending);
    p.approve(None).unwrap();
    assert_eq!(p.status, LessonStatus::Approved);
    assert!(p.supervisor_note.is_none());
  }

  #[test]
  fn rejection_requires_note_then_edit_returns_to_draft() {
    let mut p = plan();
    p.submit().unwrap();
    assert!(matches!(p.reject("  "), Err(Error::EmptyRejectionNote)));
    assert_eq!(p.status, LessonStatus::Pending);

    p.reject("أكمل المقطع").unwrap();
    assert_eq!(p.status, LessonStatus::Rejected);
    assert!(p.submit().is_err());

    p.edit(FieldValues::new()).unwrap();
    assert_eq!(p.status, LessonStatus::Draft);
    p.submit().unwrap();
    assert_eq!(p.status, LessonStatus::Pending);
  }

  #[test]
  fn approved_plan_is_read_only() {
    let mut p = plan();
    p.submit().unwrap();
    p.approve(Some("أحسنت".into())).unwrap();
    assert!(matches!(p.edit(FieldValues::new()), Err(Error::ReadOnly(_))));
    assert!(matches!(
      p.reject("x"),
      Err(Error::InvalidTransition { from: LessonStatus::Approved, .. })
    ));
  }

  #[test]
  fn cannot_approve_a_draft() {
    let mut p = plan();
    assert!(p.approve(None).is_err());
  }

  #[test]
  fn duplicating_approved_plan_carries_values_forward() {
    let mut p = plan();
    p.submit().unwrap();
    p.reject("ناقص").unwrap();
    p.edit(p.values.clone()).unwrap();
    p.submit().unwrap();
    p.approve(Some("ممتاز".into())).unwrap();

    let copy = p.duplicate_for(date(2));
    assert_ne!(copy.id, p.id);
    assert_eq!(copy.status, LessonStatus::Draft);
    assert_eq!(copy.values, p.values);
    assert_eq!(copy.date, date(2));
    assert!(copy.supervisor_note.is_none());
  }

  #[test]
  fn progress_only_for_enrolled_students() {
    let p = plan();
    let enrolled = Student::new(p.subscriber_id, "أحمد", Some(p.halaqa_id));
    let elsewhere = Student::new(p.subscriber_id, "علي", Some(Uuid::new_v4()));
    let unassigned = Student::new(p.subscriber_id, "عمر", None);

    let progress = p.progress_for([&enrolled, &elsewhere, &unassigned]);
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].student_id, enrolled.id);
    assert_eq!(progress[0].values, p.values);
  }
}
