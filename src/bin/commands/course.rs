use clap::{Args, Subcommand};
use registrar::lens::roster::{AddCourseArgs, RosterLens};
use registrar::lens::utils::OutputFormat;
use registrar::RegistrarConfig;

use super::{fail, open_database, print_change, print_rows};

/// Arguments for the Course command
#[derive(Args)]
pub struct CourseArgs {
    #[clap(subcommand)]
    pub command: CourseCommands,
}

/// Course subcommands
#[derive(Subcommand)]
pub enum CourseCommands {
    /// Add a course, or overwrite the course with the given id
    Add(AddCourseArgs),

    /// List all courses
    List,
}

pub fn run(config: &RegistrarConfig, args: CourseArgs, output_format: OutputFormat) {
    let db = open_database(config);
    let lens = RosterLens::new(&db);

    match args.command {
        CourseCommands::Add(add) => {
            if let Err(e) = add.validate() {
                fail(e);
            }
            match lens.add_course(&add) {
                Ok(change) => print_change(&change, output_format),
                Err(e) => fail(e),
            }
        }
        CourseCommands::List => match lens.courses() {
            Ok(courses) => print_rows(&courses, output_format, "courses"),
            Err(e) => fail(e),
        },
    }
}
