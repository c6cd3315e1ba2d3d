//! Student repository
//!
//! Students are keyed by `student_id` and additionally unique by email.

use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::record::{self, require_text, Record, Upserted};
use crate::database::core::{Result, StoreError};

/// A stored student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct Student {
    pub student_id: i64,
    pub student_name: String,
    pub student_email: String,
}

impl Student {
    pub fn new(student_id: i64, name: &str, email: &str) -> Self {
        Self {
            student_id,
            student_name: name.to_string(),
            student_email: email.to_string(),
        }
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student ID: {}, Name: {}, Email: {}",
            self.student_id, self.student_name, self.student_email
        )
    }
}

impl Record for Student {
    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] = &["student_id", "student_name", "student_email"];
    const KEY_COLUMNS: &'static [&'static str] = &["student_id"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.student_id, &self.student_name, &self.student_email]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Student {
            student_id: row.get(0)?,
            student_name: row.get(1)?,
            student_email: row.get(2)?,
        })
    }

    fn validate(&self) -> Result<()> {
        require_text(Self::TABLE, "student_name", &self.student_name)?;
        require_text(Self::TABLE, "student_email", &self.student_email)
    }
}

/// A student that may not have an id yet
///
/// When `student_id` is `None` the database assigns the next free id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    #[serde(default, alias = "id")]
    pub student_id: Option<i64>,
    #[serde(alias = "name")]
    pub student_name: String,
    #[serde(alias = "email")]
    pub student_email: String,
}

impl NewStudent {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            student_id: None,
            student_name: name.to_string(),
            student_email: email.to_string(),
        }
    }

    pub fn with_id(mut self, student_id: i64) -> Self {
        self.student_id = Some(student_id);
        self
    }

    fn validate(&self) -> Result<()> {
        require_text(Student::TABLE, "student_name", &self.student_name)?;
        require_text(Student::TABLE, "student_email", &self.student_email)
    }
}

/// Repository for student operations
pub struct StudentRepository<'a> {
    conn: &'a Connection,
}

impl<'a> StudentRepository<'a> {
    /// Create a new student repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Check if there are no students
    pub fn is_empty(&self) -> bool {
        self.count().map(|c| c == 0).unwrap_or(true)
    }

    pub fn count(&self) -> Result<u64> {
        record::count::<Student>(self.conn)
    }

    /// Insert a student or replace every field of the student with the same id
    ///
    /// Using an email that belongs to a different student is a constraint
    /// violation.
    pub fn upsert(&self, student: &Student) -> Result<()> {
        record::upsert(self.conn, student)?;
        debug!("upserted student {}", student.student_id);
        Ok(())
    }

    /// Insert a new student, failing on any duplicate id or email
    pub fn insert(&self, student: &NewStudent) -> Result<Student> {
        student.validate()?;
        self.conn
            .query_row(
                "INSERT INTO students (student_id, student_name, student_email)
                 VALUES (?1, ?2, ?3)
                 RETURNING student_id, student_name, student_email",
                (
                    student.student_id,
                    student.student_name.as_str(),
                    student.student_email.as_str(),
                ),
                Student::from_row,
            )
            .map_err(|e| StoreError::from_write(Student::TABLE, e))
    }

    /// Insert a student unless one with the same email already exists
    ///
    /// The existence check and the insert are one statement, resolved by the
    /// unique index on `student_email`. An existing student is returned as is.
    pub fn insert_if_absent(&self, student: &NewStudent) -> Result<Upserted<Student>> {
        student.validate()?;

        let inserted = self
            .conn
            .query_row(
                "INSERT INTO students (student_id, student_name, student_email)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (student_email) DO NOTHING
                 RETURNING student_id, student_name, student_email",
                (
                    student.student_id,
                    student.student_name.as_str(),
                    student.student_email.as_str(),
                ),
                Student::from_row,
            )
            .optional()
            .map_err(|e| StoreError::from_write(Student::TABLE, e))?;

        if let Some(new) = inserted {
            info!("added student {} <{}>", new.student_id, new.student_email);
            return Ok(Upserted::Inserted(new));
        }

        match self.find_by_email(&student.student_email)? {
            Some(existing) => Ok(Upserted::Existing(existing)),
            None => Err(StoreError::query(
                "read existing student",
                rusqlite::Error::QueryReturnedNoRows,
            )),
        }
    }

    /// Get a student by id
    pub fn get(&self, student_id: i64) -> Result<Option<Student>> {
        record::fetch(self.conn, [student_id])
    }

    /// Get a student by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<Student>> {
        let mut found = record::select_where::<Student, _>(
            self.conn,
            Some("student_email = ?1"),
            [email],
        )?;
        Ok(found.pop())
    }

    /// All students, in storage order
    pub fn list(&self) -> Result<Vec<Student>> {
        record::list(self.conn)
    }
}
