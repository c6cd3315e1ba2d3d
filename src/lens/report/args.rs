//! Report lens arguments

use serde::{Deserialize, Serialize};

use crate::database::ReportOrder;

/// Arguments for the grade and course reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct ReportArgs {
    /// Only include rows for this student id
    #[cfg_attr(feature = "cli", clap(long, value_name = "ID"))]
    #[serde(default)]
    pub student: Option<i64>,

    /// Sort rows by student name, then course name
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub sorted: bool,
}

impl ReportArgs {
    /// Report over every student
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the report to one student
    pub fn for_student(mut self, student_id: i64) -> Self {
        self.student = Some(student_id);
        self
    }

    /// Sort rows by student name, then course name
    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }

    /// Row order based on flags
    pub fn order(&self) -> ReportOrder {
        if self.sorted {
            ReportOrder::Sorted
        } else {
            ReportOrder::Unordered
        }
    }
}
