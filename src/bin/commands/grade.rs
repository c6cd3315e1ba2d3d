use clap::{Args, Subcommand};
use registrar::lens::roster::{RosterLens, SetGradeArgs};
use registrar::lens::utils::OutputFormat;
use registrar::RegistrarConfig;

use super::{fail, open_database, print_change, print_rows};

/// Arguments for the Grade command
#[derive(Args)]
pub struct GradeArgs {
    #[clap(subcommand)]
    pub command: GradeCommands,
}

/// Grade subcommands
#[derive(Subcommand)]
pub enum GradeCommands {
    /// Record a grade for a student in a course
    Set(SetGradeArgs),

    /// List all grades
    List,
}

pub fn run(config: &RegistrarConfig, args: GradeArgs, output_format: OutputFormat) {
    let db = open_database(config);
    let lens = RosterLens::new(&db);

    match args.command {
        GradeCommands::Set(set) => {
            if let Err(e) = set.validate() {
                fail(e);
            }
            match lens.set_grade(&set) {
                Ok(change) => print_change(&change, output_format),
                Err(e) => fail(e),
            }
        }
        GradeCommands::List => match lens.grades() {
            Ok(grades) => print_rows(&grades, output_format, "grades"),
            Err(e) => fail(e),
        },
    }
}
