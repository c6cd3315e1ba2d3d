#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Registrar - a school records store
//!
//! Registrar keeps students, courses and grades in a local SQLite database
//! and answers the two standard reports over them: every grade with student
//! and course names, and every course each student takes. It can be used as
//! both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `database` | SQLite records store only | `rusqlite` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `lens` | Roster and report lenses, output formats | `database` + `display` |
//! | `cli` | The `registrar` binary | All above + `clap`, `tracing-subscriber` |
//!
//! ## Choosing Features
//!
//! ```toml
//! # Minimal - just the records store
//! registrar = { version = "0.1", default-features = false, features = ["database"] }
//!
//! # Store plus lenses, without the CLI
//! registrar = { version = "0.1", default-features = false, features = ["lens"] }
//!
//! # Default (CLI binary)
//! registrar = "0.1"
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: All database functionality (always available)
//!   - `core`: SQLite connection management, schema definitions, errors
//!   - `school`: students, courses, grades and report queries
//!
//! - **[`lens`]**: High-level operations (feature `lens`)
//!   - `roster`: add students and courses, record grades, import rosters
//!   - `report`: grade and course reports in every output format
//!
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use registrar::database::{Course, Grade, ReportOrder, SchoolDatabase, Student};
//!
//! let db = SchoolDatabase::open_in_dir("~/.registrar")?;
//!
//! db.transaction(|s| {
//!     s.students().upsert(&Student::new(4, "Ralph Bunche", "ralph.bunche@moringa.com"))?;
//!     s.courses().upsert(&Course::new(4, "Python Programming", "Mr. White"))?;
//!     s.grades().upsert(&Grade::new(4, 4, "A"))
//! })?;
//!
//! for row in db.reports().student_grades(ReportOrder::Sorted)? {
//!     println!("{}", row);
//! }
//! ```

pub mod config;
pub mod database;

#[cfg(feature = "lens")]
pub mod lens;

// =============================================================================
// Configuration
// =============================================================================

pub use config::{format_size, get_database_info, DatabaseInfo, RegistrarConfig};

// =============================================================================
// Database (always available)
// =============================================================================

pub use database::{
    Course, Grade, NewCourse, NewStudent, ReportOrder, SchoolDatabase, StoreError, StoreOptions,
    Student, StudentCourseRow, StudentGradeRow, Upserted,
};
