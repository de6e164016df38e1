//! Predefined partial schema trees used as starting points for new
//! configurations.
//!
//! Template IDs follow the `id_<description>` convention. The convention is
//! cosmetic: [`crate::editor::apply_template`] regenerates every ID.

use serde::{Deserialize, Serialize};

use crate::schema::{Field, Group, SubGroup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
  pub key:    String,
  pub name:   String,
  pub groups: Vec<Group>,
}

fn field(id: &str, label: &str, is_recall_identifier: bool) -> Field {
  Field { id: id.into(), label: label.into(), is_recall_identifier }
}

fn sub_group(id: &str, label: &str, fields: Vec<Field>) -> SubGroup {
  SubGroup { id: id.into(), label: label.into(), fields }
}

fn group(id: &str, label: &str, sub_groups: Vec<SubGroup>) -> Group {
  Group { id: id.into(), label: label.into(), sub_groups }
}

/// New memorization: the verse range is the recall key.
pub fn memorization() -> Template {
  Template {
    key:    "memorization".into(),
    name:   "حفظ جديد".into(),
    groups: vec![group("id_memorization", "الحفظ", vec![
      sub_group("id_memorization_range", "المقطع", vec![
        field("id_surah", "السورة", true),
        field("id_from_ayah", "من آية", true),
        field("id_to_ayah", "إلى آية", true),
      ]),
      sub_group("id_memorization_evaluation", "التقييم", vec![
        field("id_rating", "التقدير", false),
        field("id_mistakes", "عدد الأخطاء", false),
        field("id_notes", "ملاحظات", false),
      ]),
    ])],
  }
}

/// Revision by juz and page range.
pub fn revision() -> Template {
  Template {
    key:    "revision".into(),
    name:   "مراجعة".into(),
    groups: vec![group("id_revision", "المراجعة", vec![
      sub_group("id_revision_range", "المقدار", vec![
        field("id_juz", "الجزء", true),
        field("id_from_page", "من صفحة", true),
        field("id_to_page", "إلى صفحة", true),
      ]),
      sub_group("id_revision_evaluation", "التقييم", vec![
        field("id_revision_rating", "التقدير", false),
        field("id_revision_notes", "ملاحظات", false),
      ]),
    ])],
  }
}

/// Every built-in template, in display order.
pub fn builtin_templates() -> Vec<Template> { vec![memorization(), revision()] }

/// Look up a built-in template by its key.
pub fn find_template(key: &str) -> Option<Template> {
  builtin_templates().into_iter().find(|t| t.key == key)
}
