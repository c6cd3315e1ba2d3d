//! Lens module
//!
//! This module provides high-level "lens" abstractions that combine the
//! records database with argument validation and output formatting.
//!
//! # Architecture
//!
//! Each lens module exports:
//! - A **Lens struct** (`RosterLens`, `ReportLens`) - the main entry point for all operations
//! - **Args structs** - input arguments for lens methods
//! - **Output types** - return types of lens methods
//!
//! | Lens | Purpose |
//! |------|---------|
//! | `RosterLens` | add students and courses, record grades, import rosters |
//! | `ReportLens` | student/course/grade join reports |
//!
//! # Usage
//!
//! ```rust,ignore
//! use registrar::database::SchoolDatabase;
//! use registrar::lens::report::{ReportArgs, ReportKind, ReportLens};
//! use registrar::lens::roster::{AddStudentArgs, RosterLens};
//! use registrar::lens::utils::OutputFormat;
//!
//! let db = SchoolDatabase::open("school_performance.db")?;
//! RosterLens::new(&db).add_student(&AddStudentArgs::new("Ralph Bunche", "ralph.bunche@moringa.com"))?;
//!
//! let text = ReportLens::new(&db).render(ReportKind::Grades, &ReportArgs::new(), OutputFormat::Text)?;
//! println!("{}", text);
//! ```

pub mod utils;

// RosterLens - writes to the records database
pub mod roster;

// ReportLens - join reports
pub mod report;
