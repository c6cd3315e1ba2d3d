//! Roster lens arguments
//!
//! These arguments are shared by the CLI (with clap derives when the `cli`
//! feature is enabled) and by library callers building them directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Arguments for adding a student
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct AddStudentArgs {
    /// Full name of the student
    #[cfg_attr(feature = "cli", clap(long))]
    pub name: String,

    /// Email address, unique across students
    #[cfg_attr(feature = "cli", clap(long))]
    pub email: String,

    /// Student id; assigned by the database when omitted
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub id: Option<i64>,

    /// Overwrite the student with the same id instead of keeping an existing
    /// student with the same email
    #[cfg_attr(feature = "cli", clap(long, requires = "id"))]
    #[serde(default)]
    pub replace: bool,
}

impl AddStudentArgs {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    /// Use an explicit student id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Overwrite by id
    pub fn replace(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Validate the arguments
    ///
    /// Returns an error message if the arguments are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Student name cannot be empty".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("Student email cannot be empty".to_string());
        }
        if self.replace && self.id.is_none() {
            return Err("--replace requires --id".to_string());
        }
        Ok(())
    }
}

/// Arguments for adding a course
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct AddCourseArgs {
    /// Course name
    #[cfg_attr(feature = "cli", clap(long))]
    pub name: String,

    /// Name of the teacher running the course
    #[cfg_attr(feature = "cli", clap(long))]
    pub teacher: String,

    /// Course id; an existing course with this id is overwritten.
    /// Assigned by the database when omitted.
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub id: Option<i64>,
}

impl AddCourseArgs {
    pub fn new(name: &str, teacher: &str) -> Self {
        Self {
            name: name.to_string(),
            teacher: teacher.to_string(),
            id: None,
        }
    }

    /// Use an explicit course id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Course name cannot be empty".to_string());
        }
        if self.teacher.trim().is_empty() {
            return Err("Course teacher cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Arguments for recording a grade
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct SetGradeArgs {
    /// Student id
    pub student_id: i64,

    /// Course id
    pub course_id: i64,

    /// Grade value, e.g. A or B+
    pub grade: String,

    /// Leave an existing grade for the pair untouched instead of replacing it
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub keep_existing: bool,
}

impl SetGradeArgs {
    pub fn new(student_id: i64, course_id: i64, grade: &str) -> Self {
        Self {
            student_id,
            course_id,
            grade: grade.to_string(),
            keep_existing: false,
        }
    }

    /// Keep an existing grade for the pair
    pub fn keep_existing(mut self) -> Self {
        self.keep_existing = true;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.grade.trim().is_empty() {
            return Err("Grade cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Arguments for importing a roster file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct ImportArgs {
    /// Path to a JSON roster with `students`, `courses` and `grades` arrays
    pub file: PathBuf,
}

impl ImportArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.file.exists() {
            return Err(format!("Roster file {} does not exist", self.file.display()));
        }
        Ok(())
    }
}
