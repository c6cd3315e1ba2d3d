//! Report lens
//!
//! Joins students, courses and grades into the two standard reports: every
//! grade with student and course names, and every course a student takes.

pub mod args;
pub mod types;

pub use args::ReportArgs;
pub use types::ReportKind;

use anyhow::{anyhow, Result};

use crate::database::{SchoolDatabase, StudentCourseRow, StudentGradeRow};
use crate::lens::utils::{format_rows, OutputFormat};

/// Report lens over the records database
pub struct ReportLens<'a> {
    db: &'a SchoolDatabase,
}

impl<'a> ReportLens<'a> {
    pub fn new(db: &'a SchoolDatabase) -> Self {
        Self { db }
    }

    /// Student name, course name and grade rows
    pub fn grades(&self, args: &ReportArgs) -> Result<Vec<StudentGradeRow>> {
        let reports = self.db.reports();
        let rows = match args.student {
            Some(id) => {
                self.require_student(id)?;
                reports.grades_for_student(id, args.order())?
            }
            None => reports.student_grades(args.order())?,
        };
        Ok(rows)
    }

    /// Student name and course name rows
    pub fn courses(&self, args: &ReportArgs) -> Result<Vec<StudentCourseRow>> {
        let reports = self.db.reports();
        let rows = match args.student {
            Some(id) => {
                self.require_student(id)?;
                reports.courses_for_student(id, args.order())?
            }
            None => reports.student_courses(args.order())?,
        };
        Ok(rows)
    }

    /// Run a report and render it
    ///
    /// An empty report renders as a notice in text and table formats, and as
    /// an empty array or no output in the machine-readable formats.
    pub fn render(
        &self,
        kind: ReportKind,
        args: &ReportArgs,
        format: OutputFormat,
    ) -> Result<String> {
        let (output, empty) = match kind {
            ReportKind::Grades => {
                let rows = self.grades(args)?;
                (format_rows(&rows, format), rows.is_empty())
            }
            ReportKind::Courses => {
                let rows = self.courses(args)?;
                (format_rows(&rows, format), rows.is_empty())
            }
        };

        if empty && !format.is_json() && format != OutputFormat::Psv {
            return Ok(format!("No {} found", kind));
        }
        Ok(output)
    }

    fn require_student(&self, student_id: i64) -> Result<()> {
        match self.db.students().get(student_id)? {
            Some(_) => Ok(()),
            None => Err(anyhow!("Student {} not found", student_id)),
        }
    }
}
