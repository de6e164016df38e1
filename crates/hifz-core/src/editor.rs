//! Structural edits on a [`ConfigurationDraft`].
//!
//! Every edit is local to the draft; nothing reaches storage until the draft
//! is saved. Indices that do not exist yield [`Error::IndexOutOfRange`].

use uuid::Uuid;

use crate::{
  Error, Result,
  schema::{ConfigurationDraft, Field, Group, StudyPlanConfiguration, SubGroup},
  template::Template,
};

/// Appended to the label of a duplicated group or configuration.
pub const COPY_SUFFIX: &str = " - نسخة";

const NEW_GROUP_LABEL: &str = "مجموعة جديدة";
const NEW_SUB_GROUP_LABEL: &str = "مجموعة فرعية جديدة";
const NEW_FIELD_LABEL: &str = "حقل جديد";

fn out_of_range(level: &'static str, index: usize) -> Error {
  Error::IndexOutOfRange { level, index }
}

impl ConfigurationDraft {
  fn group_mut(&mut self, group_idx: usize) -> Result<&mut Group> {
    self
      .groups
      .get_mut(group_idx)
      .ok_or_else(|| out_of_range("group", group_idx))
  }

  fn sub_group_mut(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
  ) -> Result<&mut SubGroup> {
    self
      .group_mut(group_idx)?
      .sub_groups
      .get_mut(sub_group_idx)
      .ok_or_else(|| out_of_range("sub-group", sub_group_idx))
  }

  fn field_mut(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
    field_idx: usize,
  ) -> Result<&mut Field> {
    self
      .sub_group_mut(group_idx, sub_group_idx)?
      .fields
      .get_mut(field_idx)
      .ok_or_else(|| out_of_range("field", field_idx))
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  /// Append an empty group and return its index.
  pub fn add_group(&mut self) -> usize {
    self.groups.push(Group::new(NEW_GROUP_LABEL));
    self.groups.len() - 1
  }

  pub fn remove_group(&mut self, group_idx: usize) -> Result<Group> {
    if group_idx >= self.groups.len() {
      return Err(out_of_range("group", group_idx));
    }
    Ok(self.groups.remove(group_idx))
  }

  /// Clone the group at `group_idx` with fresh IDs and a suffixed label, and
  /// insert it directly after the source. Returns the index of the copy.
  pub fn duplicate_group(&mut self, group_idx: usize) -> Result<usize> {
    let mut copy = self
      .groups
      .get(group_idx)
      .cloned()
      .ok_or_else(|| out_of_range("group", group_idx))?;
    copy.regenerate_ids();
    copy.label.push_str(COPY_SUFFIX);
    self.groups.insert(group_idx + 1, copy);
    Ok(group_idx + 1)
  }

  pub fn rename_group(
    &mut self,
    group_idx: usize,
    label: impl Into<String>,
  ) -> Result<()> {
    self.group_mut(group_idx)?.label = label.into();
    Ok(())
  }

  // ── Sub-groups ────────────────────────────────────────────────────────────

  pub fn add_sub_group(&mut self, group_idx: usize) -> Result<usize> {
    let group = self.group_mut(group_idx)?;
    group.sub_groups.push(SubGroup::new(NEW_SUB_GROUP_LABEL));
    Ok(group.sub_groups.len() - 1)
  }

  pub fn remove_sub_group(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
  ) -> Result<SubGroup> {
    let group = self.group_mut(group_idx)?;
    if sub_group_idx >= group.sub_groups.len() {
      return Err(out_of_range("sub-group", sub_group_idx));
    }
    Ok(group.sub_groups.remove(sub_group_idx))
  }

  pub fn rename_sub_group(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
    label: impl Into<String>,
  ) -> Result<()> {
    self.sub_group_mut(group_idx, sub_group_idx)?.label = label.into();
    Ok(())
  }

  // ── Fields ────────────────────────────────────────────────────────────────

  pub fn add_field(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
  ) -> Result<usize> {
    let sub = self.sub_group_mut(group_idx, sub_group_idx)?;
    sub.fields.push(Field::new(NEW_FIELD_LABEL, false));
    Ok(sub.fields.len() - 1)
  }

  pub fn remove_field(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
    field_idx: usize,
  ) -> Result<Field> {
    let sub = self.sub_group_mut(group_idx, sub_group_idx)?;
    if field_idx >= sub.fields.len() {
      return Err(out_of_range("field", field_idx));
    }
    Ok(sub.fields.remove(field_idx))
  }

  pub fn rename_field(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
    field_idx: usize,
    label: impl Into<String>,
  ) -> Result<()> {
    self.field_mut(group_idx, sub_group_idx, field_idx)?.label = label.into();
    Ok(())
  }

  /// Flip a field's recall-identifier flag and return the new value.
  ///
  /// Existing records are not touched here; saving a configuration whose
  /// identifier partition changed while records exist is refused by the
  /// repository.
  pub fn toggle_field_identifier(
    &mut self,
    group_idx: usize,
    sub_group_idx: usize,
    field_idx: usize,
  ) -> Result<bool> {
    let field = self.field_mut(group_idx, sub_group_idx, field_idx)?;
    field.is_recall_identifier = !field.is_recall_identifier;
    Ok(field.is_recall_identifier)
  }
}

/// Start a new draft, either blank or seeded from `template` with every
/// synthetic ID regenerated.
pub fn apply_template(
  subscriber_id: Uuid,
  name: impl Into<String>,
  template: Option<&Template>,
) -> ConfigurationDraft {
  let mut draft = ConfigurationDraft::new(subscriber_id, name);
  if let Some(template) = template {
    draft.groups = template.groups.clone();
    for group in &mut draft.groups {
      group.regenerate_ids();
    }
  }
  draft
}

/// An unsaved copy of `config` with fresh IDs and a suffixed name.
pub fn duplicate_configuration(
  config: &StudyPlanConfiguration,
) -> ConfigurationDraft {
  let mut draft = config.to_draft();
  draft.id = None;
  draft.name.push_str(COPY_SUFFIX);
  for group in &mut draft.groups {
    group.regenerate_ids();
  }
  draft
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;
  use crate::template;

  fn all_ids(draft: &ConfigurationDraft) -> Vec<String> {
    let mut ids = Vec::new();
    for g in &draft.groups {
      ids.push(g.id.clone());
      for s in &g.sub_groups {
        ids.push(s.id.clone());
        for f in &s.fields {
          ids.push(f.id.clone());
        }
      }
    }
    ids
  }

  #[test]
  fn blank_template_starts_empty() {
    let draft = apply_template(Uuid::new_v4(), "خطة", None);
    assert!(draft.groups.is_empty());
    assert!(draft.id.is_none());
  }

  #[test]
  fn applying_template_twice_never_shares_ids() {
    let t = template::memorization();
    let subscriber = Uuid::new_v4();
    let a = apply_template(subscriber, "a", Some(&t));
    let b = apply_template(subscriber, "b", Some(&t));

    let ids_a = all_ids(&a);
    let ids_b = all_ids(&b);
    let mut seen: HashSet<&String> = HashSet::new();
    for id in ids_a.iter().chain(&ids_b) {
      assert!(seen.insert(id), "duplicate id {id}");
      assert!(!id.starts_with("id_"), "placeholder id survived: {id}");
    }
    assert_eq!(a.fields().len(), t.groups[0].sub_groups.iter().map(|s| s.fields.len()).sum::<usize>());
  }

  #[test]
  fn duplicate_group_inserts_after_source_with_fresh_ids() {
    let mut draft =
      apply_template(Uuid::new_v4(), "x", Some(&template::revision()));
    draft.add_group();
    let copy_idx = draft.duplicate_group(0).unwrap();

    assert_eq!(copy_idx, 1);
    assert_eq!(draft.groups.len(), 3);
    assert_eq!(
      draft.groups[1].label,
      format!("{}{COPY_SUFFIX}", draft.groups[0].label)
    );
    let ids = all_ids(&draft);
    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
  }

  #[test]
  fn add_and_remove_at_every_level() {
    let mut draft = ConfigurationDraft::new(Uuid::new_v4(), "x");
    let g = draft.add_group();
    let s = draft.add_sub_group(g).unwrap();
    let f1 = draft.add_field(g, s).unwrap();
    let f2 = draft.add_field(g, s).unwrap();
    assert_eq!((f1, f2), (0, 1));
    assert_eq!(draft.fields().len(), 2);

    assert!(draft.toggle_field_identifier(g, s, f2).unwrap());
    assert!(!draft.toggle_field_identifier(g, s, f2).unwrap());

    draft.rename_field(g, s, f1, "السورة").unwrap();
    let removed = draft.remove_field(g, s, f1).unwrap();
    assert_eq!(removed.label, "السورة");
    draft.remove_sub_group(g, s).unwrap();
    assert!(draft.groups[g].sub_groups.is_empty());
    draft.remove_group(g).unwrap();
    assert!(draft.groups.is_empty());
  }

  #[test]
  fn out_of_range_edits_are_errors() {
    let mut draft = ConfigurationDraft::new(Uuid::new_v4(), "x");
    assert!(matches!(
      draft.remove_group(0),
      Err(Error::IndexOutOfRange { level: "group", index: 0 })
    ));
    draft.add_group();
    assert!(matches!(
      draft.add_field(0, 3),
      Err(Error::IndexOutOfRange { level: "sub-group", index: 3 })
    ));
    assert!(draft.duplicate_group(5).is_err());
  }

  #[test]
  fn duplicate_configuration_is_unsaved_copy() {
    let draft =
      apply_template(Uuid::new_v4(), "خطة", Some(&template::memorization()));
    let config = StudyPlanConfiguration {
      id:                        Uuid::new_v4(),
      subscriber_id:             draft.subscriber_id,
      name:                      draft.name.clone(),
      target_classification_ids: ["hifz".to_string()].into(),
      groups:                    draft.groups.clone(),
    };

    let copy = duplicate_configuration(&config);
    assert!(copy.id.is_none());
    assert_eq!(copy.name, format!("خطة{COPY_SUFFIX}"));
    assert_eq!(copy.target_classification_ids, config.target_classification_ids);
    assert_ne!(copy.groups[0].id, config.groups[0].id);
  }
}
