//! Grade repository
//!
//! A grade links one student to one course. The pair is the primary key, so
//! a student holds at most one grade per course.

use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::record::{self, require_text, Record, Upserted};
use crate::database::core::{Result, StoreError};

/// A stored grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct Grade {
    pub student_id: i64,
    pub course_id: i64,
    pub grade: String,
}

impl Grade {
    pub fn new(student_id: i64, course_id: i64, grade: &str) -> Self {
        Self {
            student_id,
            course_id,
            grade: grade.to_string(),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student ID: {}, Course ID: {}, Grade: {}",
            self.student_id, self.course_id, self.grade
        )
    }
}

impl Record for Grade {
    const TABLE: &'static str = "grades";
    const COLUMNS: &'static [&'static str] = &["student_id", "course_id", "grade"];
    const KEY_COLUMNS: &'static [&'static str] = &["student_id", "course_id"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.student_id, &self.course_id, &self.grade]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Grade {
            student_id: row.get(0)?,
            course_id: row.get(1)?,
            grade: row.get(2)?,
        })
    }

    fn validate(&self) -> Result<()> {
        require_text(Self::TABLE, "grade", &self.grade)
    }
}

/// Repository for grade operations
pub struct GradeRepository<'a> {
    conn: &'a Connection,
}

impl<'a> GradeRepository<'a> {
    /// Create a new grade repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Check if there are no grades
    pub fn is_empty(&self) -> bool {
        self.count().map(|c| c == 0).unwrap_or(true)
    }

    pub fn count(&self) -> Result<u64> {
        record::count::<Grade>(self.conn)
    }

    /// Set the grade for a (student, course) pair, replacing any previous grade
    ///
    /// With foreign keys enforced, a missing student or course is a
    /// constraint violation.
    pub fn upsert(&self, grade: &Grade) -> Result<()> {
        record::upsert(self.conn, grade)?;
        debug!(
            "upserted grade {} for student {} in course {}",
            grade.grade, grade.student_id, grade.course_id
        );
        Ok(())
    }

    /// Record a grade unless the pair already has one
    ///
    /// An existing grade is returned unchanged.
    pub fn insert_if_absent(&self, grade: &Grade) -> Result<Upserted<Grade>> {
        grade.validate()?;

        let inserted = self
            .conn
            .query_row(
                "INSERT INTO grades (student_id, course_id, grade)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (student_id, course_id) DO NOTHING
                 RETURNING student_id, course_id, grade",
                (grade.student_id, grade.course_id, grade.grade.as_str()),
                Grade::from_row,
            )
            .optional()
            .map_err(|e| StoreError::from_write(Grade::TABLE, e))?;

        if let Some(new) = inserted {
            info!(
                "added grade {} for student {} in course {}",
                new.grade, new.student_id, new.course_id
            );
            return Ok(Upserted::Inserted(new));
        }

        match self.get(grade.student_id, grade.course_id)? {
            Some(existing) => Ok(Upserted::Existing(existing)),
            None => Err(StoreError::query(
                "read existing grade",
                rusqlite::Error::QueryReturnedNoRows,
            )),
        }
    }

    /// Get the grade for a (student, course) pair
    pub fn get(&self, student_id: i64, course_id: i64) -> Result<Option<Grade>> {
        record::fetch(self.conn, [student_id, course_id])
    }

    /// All grades of one student, in storage order
    pub fn list_for_student(&self, student_id: i64) -> Result<Vec<Grade>> {
        record::select_where(self.conn, Some("student_id = ?1"), [student_id])
    }

    /// All grades, in storage order
    pub fn list(&self) -> Result<Vec<Grade>> {
        record::list(self.conn)
    }
}
