//! Database module
//!
//! This module provides all database functionality for registrar, organized into:
//!
//! - **core**: Core database infrastructure (SQLite connections, schema management, errors)
//! - **school**: The records database (students, courses, grades) and report queries
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper and StoreOptions
//! │   ├── error       # StoreError
//! │   └── schema      # Table definitions and SchemaManager
//! │
//! └── school/         # Persistent records
//!     ├── record      # Record trait, generic upsert/fetch/list
//!     ├── student     # StudentRepository
//!     ├── course      # CourseRepository
//!     ├── grade       # GradeRepository
//!     └── report      # Join queries across all three tables
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use registrar::database::{Course, Grade, ReportOrder, SchoolDatabase, Student};
//!
//! let db = SchoolDatabase::open("school_performance.db")?;
//!
//! db.transaction(|s| {
//!     s.students().upsert(&Student::new(4, "Ralph Bunche", "ralph.bunche@moringa.com"))?;
//!     s.courses().upsert(&Course::new(4, "Python Programming", "Mr. White"))?;
//!     s.grades().upsert(&Grade::new(4, 4, "A"))
//! })?;
//!
//! for row in db.reports().student_grades(ReportOrder::Unordered)? {
//!     println!("{} {} {}", row.student_name, row.course_name, row.grade);
//! }
//! ```

pub mod core;
pub mod school;

// Connection, schema and error types
pub use core::{
    DatabaseConn, Result, SchemaDefinitions, SchemaManager, SchemaStatus, StoreError,
    StoreOptions, SCHEMA_VERSION,
};

// Records database (main entry point)
pub use school::{
    Course, CourseRepository, Grade, GradeRepository, NewCourse, NewStudent, Record,
    ReportOrder, ReportRepository, SchoolDatabase, Session, StoreCounts, Student,
    StudentCourseRow, StudentGradeRow, StudentRepository, Upserted, DEFAULT_DATABASE_FILE,
};

