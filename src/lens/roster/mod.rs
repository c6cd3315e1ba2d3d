//! Roster lens
//!
//! This module provides the write side of the records database: adding
//! students and courses, recording grades and importing whole rosters.
//! It combines the repositories with duplicate handling and output notices.

pub mod args;
pub mod types;

pub use args::{AddCourseArgs, AddStudentArgs, ImportArgs, SetGradeArgs};
pub use types::{
    grade_exists_notice, student_exists_notice, ImportSummary, Roster, RosterAction,
    RosterChange, RosterGrade,
};

use anyhow::{anyhow, Result};
use tracing::info;

use crate::database::{
    Course, Grade, NewCourse, NewStudent, SchoolDatabase, Session, StoreError, Student, Upserted,
};

/// Roster lens for maintaining students, courses and grades
pub struct RosterLens<'a> {
    db: &'a SchoolDatabase,
}

impl<'a> RosterLens<'a> {
    /// Create a new roster lens
    pub fn new(db: &'a SchoolDatabase) -> Self {
        Self { db }
    }

    /// Add a student
    ///
    /// Without `replace`, a student whose email is already on file is kept
    /// as is and reported as existing. With `replace`, the student with the
    /// given id is created or overwritten.
    pub fn add_student(&self, args: &AddStudentArgs) -> Result<RosterChange<Student>> {
        args.validate().map_err(|e| anyhow!(e))?;

        if args.replace {
            let id = args.id.ok_or_else(|| anyhow!("--replace requires --id"))?;
            let student = Student::new(id, &args.name, &args.email);
            let existed = self.db.transaction(|s| {
                let existed = s.students().get(id)?.is_some();
                s.students().upsert(&student)?;
                Ok(existed)
            })?;
            return Ok(if existed {
                RosterChange::replaced(student)
            } else {
                RosterChange::added(student)
            });
        }

        let new = NewStudent {
            student_id: args.id,
            student_name: args.name.clone(),
            student_email: args.email.clone(),
        };
        Ok(match self.db.students().insert_if_absent(&new)? {
            Upserted::Inserted(student) => RosterChange::added(student),
            Upserted::Existing(student) => {
                let notice = student_exists_notice(&student.student_email);
                RosterChange::existing(student, notice)
            }
        })
    }

    /// Add a course, overwriting the course with the same id if one is given
    pub fn add_course(&self, args: &AddCourseArgs) -> Result<RosterChange<Course>> {
        args.validate().map_err(|e| anyhow!(e))?;

        match args.id {
            Some(id) => {
                let course = Course::new(id, &args.name, &args.teacher);
                let existed = self.db.transaction(|s| {
                    let existed = s.courses().get(id)?.is_some();
                    s.courses().upsert(&course)?;
                    Ok(existed)
                })?;
                Ok(if existed {
                    RosterChange::replaced(course)
                } else {
                    RosterChange::added(course)
                })
            }
            None => {
                let course = self
                    .db
                    .courses()
                    .insert(&NewCourse::new(&args.name, &args.teacher))?;
                Ok(RosterChange::added(course))
            }
        }
    }

    /// Record a grade
    ///
    /// Replaces the grade for the pair unless `keep_existing` is set, in which
    /// case an existing grade is left untouched and reported.
    pub fn set_grade(&self, args: &SetGradeArgs) -> Result<RosterChange<Grade>> {
        args.validate().map_err(|e| anyhow!(e))?;
        let grade = Grade::new(args.student_id, args.course_id, &args.grade);

        if args.keep_existing {
            return Ok(match self.db.grades().insert_if_absent(&grade)? {
                Upserted::Inserted(g) => RosterChange::added(g),
                Upserted::Existing(g) => {
                    let notice = grade_exists_notice(g.student_id, g.course_id);
                    RosterChange::existing(g, notice)
                }
            });
        }

        let existed = self.db.transaction(|s| {
            let existed = s.grades().get(grade.student_id, grade.course_id)?.is_some();
            s.grades().upsert(&grade)?;
            Ok(existed)
        })?;
        Ok(if existed {
            RosterChange::replaced(grade)
        } else {
            RosterChange::added(grade)
        })
    }

    /// Get a student by id
    pub fn student(&self, student_id: i64) -> Result<Student> {
        self.db
            .students()
            .get(student_id)?
            .ok_or_else(|| anyhow!("Student {} not found", student_id))
    }

    /// All students
    pub fn students(&self) -> Result<Vec<Student>> {
        Ok(self.db.students().list()?)
    }

    /// All courses
    pub fn courses(&self) -> Result<Vec<Course>> {
        Ok(self.db.courses().list()?)
    }

    /// All grades
    pub fn grades(&self) -> Result<Vec<Grade>> {
        Ok(self.db.grades().list()?)
    }

    /// Apply a roster as one transaction
    ///
    /// Students are added unless their email is on file, courses with an id
    /// are upserted and courses without one are inserted, and grades are added
    /// unless the pair already has one. Any failure rolls back the whole
    /// roster.
    pub fn import(&self, roster: &Roster) -> Result<ImportSummary> {
        let summary = self.db.transaction(|s| {
            let mut summary = ImportSummary::default();

            for student in &roster.students {
                match s.students().insert_if_absent(student)? {
                    Upserted::Inserted(_) => summary.students_added += 1,
                    Upserted::Existing(existing) => {
                        summary.students_existing += 1;
                        summary
                            .notices
                            .push(student_exists_notice(&existing.student_email));
                    }
                }
            }

            for course in &roster.courses {
                match course.course_id {
                    Some(id) => {
                        let existed = s.courses().get(id)?.is_some();
                        s.courses().upsert(&Course::new(
                            id,
                            &course.course_name,
                            &course.course_teacher,
                        ))?;
                        if existed {
                            summary.courses_replaced += 1;
                        } else {
                            summary.courses_added += 1;
                        }
                    }
                    None => {
                        s.courses().insert(course)?;
                        summary.courses_added += 1;
                    }
                }
            }

            for entry in &roster.grades {
                let grade = Grade::new(
                    resolve_student(s, entry)?,
                    resolve_course(s, entry)?,
                    &entry.grade,
                );
                match s.grades().insert_if_absent(&grade)? {
                    Upserted::Inserted(_) => summary.grades_added += 1,
                    Upserted::Existing(existing) => {
                        summary.grades_existing += 1;
                        summary.notices.push(grade_exists_notice(
                            existing.student_id,
                            existing.course_id,
                        ));
                    }
                }
            }

            Ok(summary)
        })?;

        info!(
            "imported roster: {} students, {} courses, {} grades added",
            summary.students_added,
            summary.courses_added + summary.courses_replaced,
            summary.grades_added
        );
        Ok(summary)
    }
}

/// Student id for a grade entry
///
/// An entry carrying both an id and an email must name the same student.
fn resolve_student(s: &Session<'_>, entry: &RosterGrade) -> crate::database::Result<i64> {
    match (entry.student_id, entry.student_email.as_deref()) {
        (Some(id), None) => return Ok(id),
        (Some(id), Some(email)) => {
            return match s.students().get(id)? {
                Some(student) if student.student_email == email => Ok(id),
                Some(student) => Err(StoreError::InvalidRecord(format!(
                    "grade entry student_id {} belongs to {}, not {}",
                    id, student.student_email, email
                ))),
                None => Err(StoreError::InvalidRecord(format!(
                    "grade entry references unknown student_id {}",
                    id
                ))),
            };
        }
        (None, _) => {}
    }
    let email = entry.student_email.as_deref().ok_or_else(|| {
        StoreError::InvalidRecord("grade entry needs a student_id or student_email".to_string())
    })?;
    match s.students().find_by_email(email)? {
        Some(student) => Ok(student.student_id),
        None => Err(StoreError::InvalidRecord(format!(
            "grade entry references unknown student email {}",
            email
        ))),
    }
}

/// Course id for a grade entry
///
/// An entry carrying both an id and a name must name the same course.
fn resolve_course(s: &Session<'_>, entry: &RosterGrade) -> crate::database::Result<i64> {
    match (entry.course_id, entry.course_name.as_deref()) {
        (Some(id), None) => return Ok(id),
        (Some(id), Some(name)) => {
            return match s.courses().get(id)? {
                Some(course) if course.course_name == name => Ok(id),
                Some(course) => Err(StoreError::InvalidRecord(format!(
                    "grade entry course_id {} is {}, not {}",
                    id, course.course_name, name
                ))),
                None => Err(StoreError::InvalidRecord(format!(
                    "grade entry references unknown course_id {}",
                    id
                ))),
            };
        }
        (None, _) => {}
    }
    let name = entry.course_name.as_deref().ok_or_else(|| {
        StoreError::InvalidRecord("grade entry needs a course_id or course_name".to_string())
    })?;
    let mut found = s.courses().find_by_name(name)?;
    match found.len() {
        1 => Ok(found.remove(0).course_id),
        0 => Err(StoreError::InvalidRecord(format!(
            "grade entry references unknown course {}",
            name
        ))),
        n => Err(StoreError::InvalidRecord(format!(
            "course name {} is ambiguous ({} courses)",
            name, n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreOptions;

    fn setup_db() -> SchoolDatabase {
        SchoolDatabase::open_in_memory().unwrap()
    }

    #[test]
    fn test_add_student_keeps_existing_email() {
        let db = setup_db();
        let lens = RosterLens::new(&db);

        let first = lens
            .add_student(&AddStudentArgs::new("John Doe", "john.doe@example.com"))
            .unwrap();
        assert_eq!(first.action, RosterAction::Added);

        let second = lens
            .add_student(&AddStudentArgs::new("Johnny", "john.doe@example.com"))
            .unwrap();
        assert_eq!(second.action, RosterAction::Existing);
        assert_eq!(second.record.student_name, "John Doe");
        assert_eq!(
            second.to_string(),
            "Student with email john.doe@example.com already exists."
        );
        assert_eq!(lens.students().unwrap().len(), 1);
    }

    #[test]
    fn test_add_student_replace() {
        let db = setup_db();
        let lens = RosterLens::new(&db);

        let args = AddStudentArgs::new("Ralph Bunche", "ralph.bunche@moringa.com")
            .with_id(4)
            .replace();
        assert_eq!(lens.add_student(&args).unwrap().action, RosterAction::Added);

        let args = AddStudentArgs::new("Ralph J. Bunche", "ralph.bunche@moringa.com")
            .with_id(4)
            .replace();
        assert_eq!(
            lens.add_student(&args).unwrap().action,
            RosterAction::Replaced
        );
        assert_eq!(lens.student(4).unwrap().student_name, "Ralph J. Bunche");
    }

    #[test]
    fn test_add_student_invalid() {
        let db = setup_db();
        let lens = RosterLens::new(&db);
        assert!(lens.add_student(&AddStudentArgs::new("", "a@b.c")).is_err());
        assert!(lens.student(1).is_err());
    }

    #[test]
    fn test_add_course() {
        let db = setup_db();
        let lens = RosterLens::new(&db);

        let math = lens
            .add_course(&AddCourseArgs::new("Mathematics", "Jane Smith"))
            .unwrap();
        assert_eq!(math.action, RosterAction::Added);

        let python = AddCourseArgs::new("Python Programming", "Mr. White").with_id(4);
        assert_eq!(lens.add_course(&python).unwrap().action, RosterAction::Added);
        assert_eq!(
            lens.add_course(&python).unwrap().action,
            RosterAction::Replaced
        );
        assert_eq!(lens.courses().unwrap().len(), 2);
    }

    #[test]
    fn test_set_grade() {
        let db = setup_db();
        let lens = RosterLens::new(&db);
        db.students()
            .upsert(&Student::new(104, "Charlie Green", "charlie.green@moringa.com"))
            .unwrap();
        db.courses()
            .upsert(&Course::new(101, "Mathematics", "Jane Smith"))
            .unwrap();

        let added = lens.set_grade(&SetGradeArgs::new(104, 101, "B")).unwrap();
        assert_eq!(added.action, RosterAction::Added);

        let kept = lens
            .set_grade(&SetGradeArgs::new(104, 101, "A").keep_existing())
            .unwrap();
        assert_eq!(kept.action, RosterAction::Existing);
        assert_eq!(kept.record.grade, "B");
        assert_eq!(
            kept.notice.as_deref(),
            Some("Grade for student_id 104 in course_id 101 already exists.")
        );

        let replaced = lens.set_grade(&SetGradeArgs::new(104, 101, "A")).unwrap();
        assert_eq!(replaced.action, RosterAction::Replaced);
        assert_eq!(lens.grades().unwrap(), vec![Grade::new(104, 101, "A")]);
    }

    #[test]
    fn test_set_grade_unknown_student() {
        let db = setup_db();
        let lens = RosterLens::new(&db);
        assert!(lens.set_grade(&SetGradeArgs::new(4, 2, "C")).is_err());
        assert!(lens.grades().unwrap().is_empty());

        let lenient = SchoolDatabase::open_in_memory_with(StoreOptions::lenient()).unwrap();
        let lens = RosterLens::new(&lenient);
        assert!(lens.set_grade(&SetGradeArgs::new(4, 2, "C")).is_ok());
    }

    fn sample_roster() -> Roster {
        Roster {
            students: vec![
                NewStudent::new("Alice Wanja", "alice.wanja@moringa.com"),
                NewStudent::new("Paul Victor", "paul.victor@moringa.com"),
                NewStudent::new("Charlie Green", "charlie.green@moringa.com").with_id(104),
            ],
            courses: vec![
                NewCourse::new("Mathematics", "Jane Smith").with_id(101),
                NewCourse::new("Biology", "Mr. White"),
            ],
            grades: vec![
                RosterGrade::new(104, 101, "B"),
                RosterGrade {
                    student_email: Some("alice.wanja@moringa.com".to_string()),
                    course_name: Some("Biology".to_string()),
                    grade: "A".to_string(),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_import() {
        let db = setup_db();
        let lens = RosterLens::new(&db);

        let summary = lens.import(&sample_roster()).unwrap();
        assert_eq!(summary.students_added, 3);
        assert_eq!(summary.courses_added, 2);
        assert_eq!(summary.grades_added, 2);
        assert!(summary.notices.is_empty());

        let alice = db
            .students()
            .find_by_email("alice.wanja@moringa.com")
            .unwrap()
            .unwrap();
        let grades = db.grades().list_for_student(alice.student_id).unwrap();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].grade, "A");
    }

    #[test]
    fn test_import_twice_reports_existing() {
        let db = setup_db();
        let lens = RosterLens::new(&db);

        let mut roster = sample_roster();
        roster.courses.truncate(1);
        roster.grades.truncate(1);
        lens.import(&roster).unwrap();

        let summary = lens.import(&roster).unwrap();
        assert_eq!(summary.students_added, 0);
        assert_eq!(summary.students_existing, 3);
        assert_eq!(summary.courses_replaced, 1);
        assert_eq!(summary.grades_existing, 1);
        assert_eq!(summary.notices.len(), 4);
        assert_eq!(
            summary.notices[3],
            "Grade for student_id 104 in course_id 101 already exists."
        );
        assert_eq!(db.counts().unwrap().students, 3);
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let db = setup_db();
        let lens = RosterLens::new(&db);

        let mut roster = sample_roster();
        roster.grades.push(RosterGrade {
            student_email: Some("nobody@moringa.com".to_string()),
            course_id: Some(101),
            grade: "C".to_string(),
            ..Default::default()
        });

        let err = lens.import(&roster).unwrap_err();
        assert!(err.to_string().contains("nobody@moringa.com"));
        assert_eq!(db.counts().unwrap(), Default::default());
    }

    #[test]
    fn test_import_rejects_conflicting_grade_keys() {
        let db = setup_db();
        let lens = RosterLens::new(&db);

        let mut roster = sample_roster();
        roster.grades.push(RosterGrade {
            student_id: Some(104),
            student_email: Some("alice.wanja@moringa.com".to_string()),
            course_id: Some(101),
            grade: "C".to_string(),
            ..Default::default()
        });
        let err = lens.import(&roster).unwrap_err();
        assert!(err.to_string().contains("student_id 104"));
        assert_eq!(db.counts().unwrap(), Default::default());

        let mut roster = sample_roster();
        roster.grades.push(RosterGrade {
            student_id: Some(104),
            course_id: Some(101),
            course_name: Some("Biology".to_string()),
            grade: "C".to_string(),
            ..Default::default()
        });
        let err = lens.import(&roster).unwrap_err();
        assert!(err.to_string().contains("course_id 101"));

        let mut roster = sample_roster();
        roster.grades[0] = RosterGrade {
            student_id: Some(104),
            student_email: Some("charlie.green@moringa.com".to_string()),
            course_id: Some(101),
            course_name: Some("Mathematics".to_string()),
            grade: "B".to_string(),
        };
        assert_eq!(lens.import(&roster).unwrap().grades_added, 2);
    }
}
