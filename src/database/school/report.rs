//! Cross-table report queries
//!
//! Enrollment is not a separate concept: a student takes a course when a
//! grade exists for the pair. All queries are inner joins, so grades whose
//! student or course is missing never show up.

use rusqlite::{Connection, Params, Row};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::database::core::{Result, StoreError};

/// Row of the student/course/grade join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct StudentGradeRow {
    pub student_name: String,
    pub course_name: String,
    pub grade: String,
}

impl fmt::Display for StudentGradeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student Name: {}, Course: {}, Grade: {}",
            self.student_name, self.course_name, self.grade
        )
    }
}

/// Row of the student/course join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct StudentCourseRow {
    pub student_name: String,
    pub course_name: String,
}

impl fmt::Display for StudentCourseRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Student Name: {}, Course: {}",
            self.student_name, self.course_name
        )
    }
}

/// Row ordering for report queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOrder {
    /// Whatever order SQLite produces; callers must not rely on it
    #[default]
    Unordered,
    /// Sorted by student name, then course name
    Sorted,
}

impl ReportOrder {
    fn clause(&self) -> &'static str {
        match self {
            ReportOrder::Unordered => "",
            ReportOrder::Sorted => " ORDER BY students.student_name, courses.course_name",
        }
    }
}

const STUDENT_GRADES_SQL: &str = "SELECT students.student_name, courses.course_name, grades.grade
     FROM grades
     INNER JOIN students ON students.student_id = grades.student_id
     INNER JOIN courses ON courses.course_id = grades.course_id";

const STUDENT_COURSES_SQL: &str = "SELECT students.student_name, courses.course_name
     FROM students
     JOIN grades ON students.student_id = grades.student_id
     JOIN courses ON courses.course_id = grades.course_id";

/// Repository for report queries spanning all three tables
pub struct ReportRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ReportRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Every grade with its student and course names
    pub fn student_grades(&self, order: ReportOrder) -> Result<Vec<StudentGradeRow>> {
        let sql = format!("{}{}", STUDENT_GRADES_SQL, order.clause());
        self.query(&sql, [], grade_row)
    }

    /// Grades of a single student
    pub fn grades_for_student(
        &self,
        student_id: i64,
        order: ReportOrder,
    ) -> Result<Vec<StudentGradeRow>> {
        let sql = format!(
            "{} WHERE grades.student_id = ?1{}",
            STUDENT_GRADES_SQL,
            order.clause()
        );
        self.query(&sql, [student_id], grade_row)
    }

    /// Every (student, course) pair that has a grade
    pub fn student_courses(&self, order: ReportOrder) -> Result<Vec<StudentCourseRow>> {
        let sql = format!("{}{}", STUDENT_COURSES_SQL, order.clause());
        self.query(&sql, [], course_row)
    }

    /// Courses a single student is taking
    pub fn courses_for_student(
        &self,
        student_id: i64,
        order: ReportOrder,
    ) -> Result<Vec<StudentCourseRow>> {
        let sql = format!(
            "{} WHERE students.student_id = ?1{}",
            STUDENT_COURSES_SQL,
            order.clause()
        );
        self.query(&sql, [student_id], course_row)
    }

    fn query<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StoreError::query("prepare report", e))?;
        let rows = stmt
            .query_map(params, f)
            .map_err(|e| StoreError::query("run report", e))?;
        let results = rows
            .collect::<rusqlite::Result<Vec<T>>>()
            .map_err(|e| StoreError::query("read report row", e))?;
        Ok(results)
    }
}

fn grade_row(row: &Row<'_>) -> rusqlite::Result<StudentGradeRow> {
    Ok(StudentGradeRow {
        student_name: row.get(0)?,
        course_name: row.get(1)?,
        grade: row.get(2)?,
    })
}

fn course_row(row: &Row<'_>) -> rusqlite::Result<StudentCourseRow> {
    Ok(StudentCourseRow {
        student_name: row.get(0)?,
        course_name: row.get(1)?,
    })
}
