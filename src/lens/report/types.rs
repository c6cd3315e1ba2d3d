//! Report lens types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which join a report runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Student name, course name and grade
    Grades,
    /// Student name and course name
    Courses,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Grades => write!(f, "grades"),
            ReportKind::Courses => write!(f, "courses"),
        }
    }
}
