//! Course repository

use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use super::record::{self, require_text, Record};
use crate::database::core::{Result, StoreError};

/// A stored course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct Course {
    pub course_id: i64,
    pub course_name: String,
    pub course_teacher: String,
}

impl Course {
    pub fn new(course_id: i64, name: &str, teacher: &str) -> Self {
        Self {
            course_id,
            course_name: name.to_string(),
            course_teacher: teacher.to_string(),
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Course ID: {}, Name: {}, Teacher: {}",
            self.course_id, self.course_name, self.course_teacher
        )
    }
}

impl Record for Course {
    const TABLE: &'static str = "courses";
    const COLUMNS: &'static [&'static str] = &["course_id", "course_name", "course_teacher"];
    const KEY_COLUMNS: &'static [&'static str] = &["course_id"];

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.course_id, &self.course_name, &self.course_teacher]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Course {
            course_id: row.get(0)?,
            course_name: row.get(1)?,
            course_teacher: row.get(2)?,
        })
    }

    fn validate(&self) -> Result<()> {
        require_text(Self::TABLE, "course_name", &self.course_name)?;
        require_text(Self::TABLE, "course_teacher", &self.course_teacher)
    }
}

/// A course that may not have an id yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    #[serde(default, alias = "id")]
    pub course_id: Option<i64>,
    #[serde(alias = "name")]
    pub course_name: String,
    #[serde(alias = "teacher")]
    pub course_teacher: String,
}

impl NewCourse {
    pub fn new(name: &str, teacher: &str) -> Self {
        Self {
            course_id: None,
            course_name: name.to_string(),
            course_teacher: teacher.to_string(),
        }
    }

    pub fn with_id(mut self, course_id: i64) -> Self {
        self.course_id = Some(course_id);
        self
    }
}

/// Repository for course operations
pub struct CourseRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CourseRepository<'a> {
    /// Create a new course repository
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Check if there are no courses
    pub fn is_empty(&self) -> bool {
        self.count().map(|c| c == 0).unwrap_or(true)
    }

    pub fn count(&self) -> Result<u64> {
        record::count::<Course>(self.conn)
    }

    /// Insert a course or replace every field of the course with the same id
    pub fn upsert(&self, course: &Course) -> Result<()> {
        record::upsert(self.conn, course)?;
        debug!("upserted course {}", course.course_id);
        Ok(())
    }

    /// Insert a new course; the database picks the id when none is given
    pub fn insert(&self, course: &NewCourse) -> Result<Course> {
        require_text(Course::TABLE, "course_name", &course.course_name)?;
        require_text(Course::TABLE, "course_teacher", &course.course_teacher)?;

        let created = self
            .conn
            .query_row(
                "INSERT INTO courses (course_id, course_name, course_teacher)
                 VALUES (?1, ?2, ?3)
                 RETURNING course_id, course_name, course_teacher",
                (
                    course.course_id,
                    course.course_name.as_str(),
                    course.course_teacher.as_str(),
                ),
                Course::from_row,
            )
            .map_err(|e| StoreError::from_write(Course::TABLE, e))?;

        info!("added course {} ({})", created.course_id, created.course_name);
        Ok(created)
    }

    /// Get a course by id
    pub fn get(&self, course_id: i64) -> Result<Option<Course>> {
        record::fetch(self.conn, [course_id])
    }

    /// Courses with exactly this name (names are not unique)
    pub fn find_by_name(&self, name: &str) -> Result<Vec<Course>> {
        record::select_where(self.conn, Some("course_name = ?1"), [name])
    }

    /// All courses, in storage order
    pub fn list(&self) -> Result<Vec<Course>> {
        record::list(self.conn)
    }
}
