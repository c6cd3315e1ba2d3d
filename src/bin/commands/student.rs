use clap::{Args, Subcommand};
use registrar::lens::roster::{AddStudentArgs, RosterLens};
use registrar::lens::utils::OutputFormat;
use registrar::RegistrarConfig;

use super::{fail, open_database, print_change, print_rows};

/// Arguments for the Student command
#[derive(Args)]
pub struct StudentArgs {
    #[clap(subcommand)]
    pub command: StudentCommands,
}

/// Student subcommands
#[derive(Subcommand)]
pub enum StudentCommands {
    /// Add a student; an existing student with the same email is kept
    Add(AddStudentArgs),

    /// List all students
    List,

    /// Show a single student
    Show {
        /// Student id
        #[clap(value_name = "ID")]
        id: i64,
    },
}

pub fn run(config: &RegistrarConfig, args: StudentArgs, output_format: OutputFormat) {
    let db = open_database(config);
    let lens = RosterLens::new(&db);

    match args.command {
        StudentCommands::Add(add) => {
            if let Err(e) = add.validate() {
                fail(e);
            }
            match lens.add_student(&add) {
                Ok(change) => print_change(&change, output_format),
                Err(e) => fail(e),
            }
        }
        StudentCommands::List => match lens.students() {
            Ok(students) => print_rows(&students, output_format, "students"),
            Err(e) => fail(e),
        },
        StudentCommands::Show { id } => match lens.student(id) {
            Ok(student) => print_rows(&[student], output_format, "students"),
            Err(e) => fail(e),
        },
    }
}
