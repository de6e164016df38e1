//! [`PeopleRepository`] — teachers and students.

use tokio::sync::Mutex;
use uuid::Uuid;

use super::{STUDENTS, TEACHERS, load, save};
use crate::{
  Result,
  kv::KeyValueStore,
  people::{Student, Teacher, UNKNOWN_NAME},
};

pub struct PeopleRepository<K> {
  kv:   K,
  lock: Mutex<()>,
}

impl<K: KeyValueStore> PeopleRepository<K> {
  pub fn new(kv: K) -> Self { Self { kv, lock: Mutex::new(()) } }

  async fn teachers(&self) -> Result<Vec<Teacher>> {
    load(&self.kv, TEACHERS).await
  }

  async fn students(&self) -> Result<Vec<Student>> {
    load(&self.kv, STUDENTS).await
  }

  // ── Teachers ──────────────────────────────────────────────────────────────

  /// Insert or replace a teacher by ID.
  pub async fn upsert_teacher(&self, teacher: Teacher) -> Result<Teacher> {
    let _guard = self.lock.lock().await;
    let mut teachers = self.teachers().await?;
    match teachers.iter_mut().find(|t| t.id == teacher.id) {
      Some(slot) => *slot = teacher.clone(),
      None => teachers.push(teacher.clone()),
    }
    save(&self.kv, TEACHERS, &teachers).await?;
    Ok(teacher)
  }

  pub async fn list_teachers(&self, subscriber_id: Uuid) -> Result<Vec<Teacher>> {
    let mut teachers = self.teachers().await?;
    teachers.retain(|t| t.subscriber_id == subscriber_id);
    Ok(teachers)
  }

  pub async fn get_teacher(&self, id: Uuid) -> Result<Option<Teacher>> {
    Ok(self.teachers().await?.into_iter().find(|t| t.id == id))
  }

  /// The teacher's name, or [`UNKNOWN_NAME`] for an unknown ID.
  pub async fn teacher_name(&self, id: Uuid) -> Result<String> {
    Ok(
      self
        .get_teacher(id)
        .await?
        .map_or_else(|| UNKNOWN_NAME.to_owned(), |t| t.name),
    )
  }

  // ── Students ──────────────────────────────────────────────────────────────

  /// Insert or replace a student by ID.
  pub async fn upsert_student(&self, student: Student) -> Result<Student> {
    let _guard = self.lock.lock().await;
    let mut students = self.students().await?;
    match students.iter_mut().find(|s| s.id == student.id) {
      Some(slot) => *slot = student.clone(),
      None => students.push(student.clone()),
    }
    save(&self.kv, STUDENTS, &students).await?;
    Ok(student)
  }

  pub async fn list_students(&self, subscriber_id: Uuid) -> Result<Vec<Student>> {
    let mut students = self.students().await?;
    students.retain(|s| s.subscriber_id == subscriber_id);
    Ok(students)
  }

  pub async fn students_in_halaqa(&self, halaqa_id: Uuid) -> Result<Vec<Student>> {
    let mut students = self.students().await?;
    students.retain(|s| s.halaqa_id == Some(halaqa_id));
    Ok(students)
  }

  /// The student's name, or [`UNKNOWN_NAME`] for an unknown ID.
  pub async fn student_name(&self, id: Uuid) -> Result<String> {
    Ok(
      self
        .students()
        .await?
        .into_iter()
        .find(|s| s.id == id)
        .map_or_else(|| UNKNOWN_NAME.to_owned(), |s| s.name),
    )
  }
}
