//! Roster lens types

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::database::{NewCourse, NewStudent};

/// What a roster write did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterAction {
    /// A new row was written
    Added,
    /// A row with the same key was overwritten
    Replaced,
    /// A matching row already existed and was left untouched
    Existing,
}

impl fmt::Display for RosterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterAction::Added => write!(f, "Added"),
            RosterAction::Replaced => write!(f, "Replaced"),
            RosterAction::Existing => write!(f, "Existing"),
        }
    }
}

/// Result of a single roster write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterChange<T> {
    pub action: RosterAction,
    pub record: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl<T> RosterChange<T> {
    pub fn added(record: T) -> Self {
        Self {
            action: RosterAction::Added,
            record,
            notice: None,
        }
    }

    pub fn replaced(record: T) -> Self {
        Self {
            action: RosterAction::Replaced,
            record,
            notice: None,
        }
    }

    pub fn existing(record: T, notice: String) -> Self {
        Self {
            action: RosterAction::Existing,
            record,
            notice: Some(notice),
        }
    }
}

impl<T: fmt::Display> fmt::Display for RosterChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.notice {
            Some(notice) => write!(f, "{}", notice),
            None => write!(f, "{} {}", self.action, self.record),
        }
    }
}

/// Notice for a student whose email is already on file
pub fn student_exists_notice(email: &str) -> String {
    format!("Student with email {} already exists.", email)
}

/// Notice for a grade that is already recorded for the pair
pub fn grade_exists_notice(student_id: i64, course_id: i64) -> String {
    format!(
        "Grade for student_id {} in course_id {} already exists.",
        student_id, course_id
    )
}

/// A grade entry in a roster file
///
/// The student is referenced by id or by email and the course by id or by
/// name, so a roster can grade students and courses that only receive their
/// ids during the same import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterGrade {
    #[serde(default)]
    pub student_id: Option<i64>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default)]
    pub course_name: Option<String>,
    pub grade: String,
}

impl RosterGrade {
    pub fn new(student_id: i64, course_id: i64, grade: &str) -> Self {
        Self {
            student_id: Some(student_id),
            course_id: Some(course_id),
            grade: grade.to_string(),
            ..Default::default()
        }
    }
}

/// A batch of students, courses and grades applied together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<NewStudent>,
    #[serde(default)]
    pub courses: Vec<NewCourse>,
    #[serde(default)]
    pub grades: Vec<RosterGrade>,
}

impl Roster {
    /// Parse a roster from JSON text
    pub fn from_json_str(s: &str) -> Result<Roster> {
        serde_json::from_str(s).map_err(|e| anyhow!("Invalid roster: {}", e))
    }

    /// Read a roster from a JSON file
    pub fn from_path(path: &Path) -> Result<Roster> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Unable to read roster {}: {}", path.display(), e))?;
        Self::from_json_str(&content)
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty() && self.courses.is_empty() && self.grades.is_empty()
    }
}

/// Counts reported by a roster import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub students_added: usize,
    pub students_existing: usize,
    pub courses_added: usize,
    pub courses_replaced: usize,
    pub grades_added: usize,
    pub grades_existing: usize,
    /// Duplicate notices, in roster order
    pub notices: Vec<String>,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for notice in &self.notices {
            writeln!(f, "{}", notice)?;
        }
        writeln!(
            f,
            "Students: {} added, {} already present",
            self.students_added, self.students_existing
        )?;
        writeln!(
            f,
            "Courses:  {} added, {} replaced",
            self.courses_added, self.courses_replaced
        )?;
        write!(
            f,
            "Grades:   {} added, {} already present",
            self.grades_added, self.grades_existing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices() {
        assert_eq!(
            student_exists_notice("john.doe@example.com"),
            "Student with email john.doe@example.com already exists."
        );
        assert_eq!(
            grade_exists_notice(104, 101),
            "Grade for student_id 104 in course_id 101 already exists."
        );
    }

    #[test]
    fn test_roster_from_json() {
        let roster = Roster::from_json_str(
            r#"{
                "students": [
                    {"name": "Alice Wanja", "email": "alice.wanja@moringa.com"},
                    {"id": 104, "name": "Charlie Green", "email": "charlie.green@moringa.com"}
                ],
                "courses": [{"id": 101, "name": "Mathematics", "teacher": "Jane Smith"}],
                "grades": [
                    {"student_id": 104, "course_id": 101, "grade": "B"},
                    {"student_email": "alice.wanja@moringa.com", "course_name": "Mathematics", "grade": "A"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(roster.students.len(), 2);
        assert_eq!(roster.students[1].student_id, Some(104));
        assert_eq!(roster.courses[0].course_teacher, "Jane Smith");
        assert_eq!(roster.grades[0], RosterGrade::new(104, 101, "B"));
        assert_eq!(
            roster.grades[1].student_email.as_deref(),
            Some("alice.wanja@moringa.com")
        );
    }

    #[test]
    fn test_roster_missing_sections() {
        let roster = Roster::from_json_str(r#"{"students": []}"#).unwrap();
        assert!(roster.is_empty());
        assert!(Roster::from_json_str("not json").is_err());
    }

    #[test]
    fn test_change_display() {
        let added = RosterChange::added("row".to_string());
        assert_eq!(added.to_string(), "Added row");

        let existing = RosterChange::existing(
            "row".to_string(),
            student_exists_notice("a@example.com"),
        );
        assert_eq!(
            existing.to_string(),
            "Student with email a@example.com already exists."
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = ImportSummary {
            students_added: 2,
            students_existing: 1,
            notices: vec![student_exists_notice("a@example.com")],
            ..Default::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("Student with email a@example.com already exists.\n"));
        assert!(text.contains("Students: 2 added, 1 already present"));
    }
}
