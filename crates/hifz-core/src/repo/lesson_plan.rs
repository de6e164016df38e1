//! [`LessonPlanRepository`] — lesson plans and the progress entries they
//! produce.

use chrono::NaiveDate;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
  LESSON_PLANS, STUDENT_PROGRESS, STUDENTS, STUDY_PLAN_CONFIGURATIONS,
  TEACHERS, load, save,
};
use crate::{
  Error, Result,
  kv::KeyValueStore,
  lesson::{LessonPlan, NewLessonPlan, StudentProgress},
  people::{Student, Teacher},
  record::FieldValues,
  schema::StudyPlanConfiguration,
};

pub struct LessonPlanRepository<K> {
  kv:   K,
  lock: Mutex<()>,
}

impl<K: KeyValueStore> LessonPlanRepository<K> {
  pub fn new(kv: K) -> Self { Self { kv, lock: Mutex::new(()) } }

  async fn plans(&self) -> Result<Vec<LessonPlan>> {
    load(&self.kv, LESSON_PLANS).await
  }

  /// Load, mutate and persist one plan under the write lock.
  async fn update<F>(&self, id: Uuid, f: F) -> Result<LessonPlan>
  where
    F: FnOnce(&mut LessonPlan) -> Result<()>,
  {
    let _guard = self.lock.lock().await;
    let mut plans = self.plans().await?;
    let plan = plans
      .iter_mut()
      .find(|p| p.id == id)
      .ok_or(Error::LessonPlanNotFound(id))?;
    f(plan)?;
    let updated = plan.clone();
    save(&self.kv, LESSON_PLANS, &plans).await?;
    Ok(updated)
  }

  async fn configuration(&self, id: Uuid) -> Result<StudyPlanConfiguration> {
    let configs: Vec<StudyPlanConfiguration> =
      load(&self.kv, STUDY_PLAN_CONFIGURATIONS).await?;
    configs
      .into_iter()
      .find(|c| c.id == id)
      .ok_or(Error::ConfigurationNotFound(id))
  }

  /// The plan's teacher must exist in the plan's subscriber and hold a
  /// classification the configuration is assigned to. Values must be keyed
  /// by the configuration's fields.
  async fn check_new(&self, plan: &LessonPlan) -> Result<()> {
    let config = self.configuration(plan.plan_config_id).await?;
    let teachers: Vec<Teacher> = load(&self.kv, TEACHERS).await?;
    let teacher = teachers
      .iter()
      .find(|t| t.id == plan.teacher_id)
      .ok_or(Error::TeacherNotFound(plan.teacher_id))?;

    if config.subscriber_id != plan.subscriber_id
      || teacher.subscriber_id != plan.subscriber_id
      || !config.is_available_to(teacher.classification_id.as_deref())
    {
      return Err(Error::ConfigurationNotAvailable {
        config:  config.id,
        teacher: teacher.id,
      });
    }
    config.check_field_ids(&plan.values)
  }

  async fn insert(&self, plan: LessonPlan) -> Result<LessonPlan> {
    self.check_new(&plan).await?;

    let _guard = self.lock.lock().await;
    let mut plans = self.plans().await?;
    plans.push(plan.clone());
    save(&self.kv, LESSON_PLANS, &plans).await?;
    tracing::debug!(plan_id = %plan.id, date = %plan.date, "created lesson plan");
    Ok(plan)
  }

  pub async fn create(&self, input: NewLessonPlan) -> Result<LessonPlan> {
    self.insert(LessonPlan::new(input)).await
  }

  pub async fn get(&self, id: Uuid) -> Result<Option<LessonPlan>> {
    Ok(self.plans().await?.into_iter().find(|p| p.id == id))
  }

  /// A teacher's plans, newest date first.
  pub async fn list_for_teacher(
    &self,
    teacher_id: Uuid,
  ) -> Result<Vec<LessonPlan>> {
    let mut plans = self.plans().await?;
    plans.retain(|p| p.teacher_id == teacher_id);
    plans.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(plans)
  }

  pub async fn edit(&self, id: Uuid, values: FieldValues) -> Result<LessonPlan> {
    let plan = self.get(id).await?.ok_or(Error::LessonPlanNotFound(id))?;
    self
      .configuration(plan.plan_config_id)
      .await?
      .check_field_ids(&values)?;
    self.update(id, |p| p.edit(values)).await
  }

  pub async fn submit(&self, id: Uuid) -> Result<LessonPlan> {
    self.update(id, LessonPlan::submit).await
  }

  pub async fn approve(
    &self,
    id: Uuid,
    note: Option<String>,
  ) -> Result<LessonPlan> {
    let plan = self.update(id, |p| p.approve(note)).await?;
    tracing::info!(plan_id = %id, "approved lesson plan");
    Ok(plan)
  }

  pub async fn reject(&self, id: Uuid, note: &str) -> Result<LessonPlan> {
    let plan = self.update(id, |p| p.reject(note)).await?;
    tracing::info!(plan_id = %id, "rejected lesson plan");
    Ok(plan)
  }

  /// Copy a plan into a new draft dated `date`.
  pub async fn duplicate(&self, id: Uuid, date: NaiveDate) -> Result<LessonPlan> {
    let source = self.get(id).await?.ok_or(Error::LessonPlanNotFound(id))?;
    self.insert(source.duplicate_for(date)).await
  }

  /// Push the plan's values into the daily progress of every student in its
  /// halaqa, replacing any entry already recorded for the same student,
  /// date and configuration. Allowed in any status.
  pub async fn apply_to_students(
    &self,
    id: Uuid,
  ) -> Result<Vec<StudentProgress>> {
    let plan = self.get(id).await?.ok_or(Error::LessonPlanNotFound(id))?;
    let students: Vec<Student> = load(&self.kv, STUDENTS).await?;
    let fresh = plan.progress_for(students.iter());

    let _guard = self.lock.lock().await;
    let mut progress: Vec<StudentProgress> =
      load(&self.kv, STUDENT_PROGRESS).await?;
    progress.retain(|old| !fresh.iter().any(|new| new.same_slot(old)));
    progress.extend(fresh.iter().cloned());
    save(&self.kv, STUDENT_PROGRESS, &progress).await?;

    tracing::info!(
      plan_id = %id,
      status = ?plan.status,
      students = fresh.len(),
      "applied lesson plan to students"
    );
    Ok(fresh)
  }

  /// A student's progress entries, oldest first.
  pub async fn progress_for_student(
    &self,
    student_id: Uuid,
  ) -> Result<Vec<StudentProgress>> {
    let mut progress: Vec<StudentProgress> =
      load(&self.kv, STUDENT_PROGRESS).await?;
    progress.retain(|p| p.student_id == student_id);
    progress.sort_by_key(|p| p.date);
    Ok(progress)
  }
}
