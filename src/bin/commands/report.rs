use clap::{Args, Subcommand};
use registrar::lens::report::{self, ReportKind, ReportLens};
use registrar::lens::utils::OutputFormat;
use registrar::RegistrarConfig;

use super::{fail, open_database};

/// Arguments for the Report command
#[derive(Args)]
pub struct ReportArgs {
    #[clap(subcommand)]
    pub command: ReportCommands,
}

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Student name, course name and grade for every recorded grade
    Grades(report::ReportArgs),

    /// Student name and course name for every course a student takes
    Courses(report::ReportArgs),
}

pub fn run(config: &RegistrarConfig, args: ReportArgs, output_format: OutputFormat) {
    let (kind, report_args) = match args.command {
        ReportCommands::Grades(a) => (ReportKind::Grades, a),
        ReportCommands::Courses(a) => (ReportKind::Courses, a),
    };

    let db = open_database(config);
    let lens = ReportLens::new(&db);

    match lens.render(kind, &report_args, output_format) {
        Ok(output) => println!("{}", output),
        Err(e) => fail(e),
    }
}
