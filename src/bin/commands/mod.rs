pub mod course;
pub mod grade;
pub mod import;
pub mod report;
pub mod status;
pub mod student;

use registrar::database::SchoolDatabase;
use registrar::lens::roster::RosterChange;
use registrar::lens::utils::{format_rows, OutputFormat};
use registrar::RegistrarConfig;
use serde::Serialize;
use std::fmt::Display;
use tabled::Tabled;

/// Log and print an error, then exit with a non-zero status
pub(crate) fn fail(e: impl Display) -> ! {
    tracing::error!("{}", e);
    eprintln!("ERROR: {}", e);
    std::process::exit(1);
}

/// Open the configured records database or exit
pub(crate) fn open_database(config: &RegistrarConfig) -> SchoolDatabase {
    match SchoolDatabase::open_with(&config.database_path(), config.store_options()) {
        Ok(db) => db,
        Err(e) => fail(format!("Failed to open database: {}", e)),
    }
}

/// Print a list of records, or a notice when there are none
pub(crate) fn print_rows<T>(rows: &[T], output_format: OutputFormat, what: &str)
where
    T: Serialize + Tabled + Display,
{
    if rows.is_empty() && !output_format.is_json() && output_format != OutputFormat::Psv {
        println!("No {} found", what);
        return;
    }
    println!("{}", format_rows(rows, output_format));
}

/// Print the outcome of a single roster write
pub(crate) fn print_change<T>(change: &RosterChange<T>, output_format: OutputFormat)
where
    T: Serialize + Tabled + Display,
{
    match output_format {
        OutputFormat::Text => println!("{}", change),
        OutputFormat::Json | OutputFormat::JsonLine => match serde_json::to_string(change) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing result: {}", e),
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(change) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing result: {}", e),
        },
        _ => {
            if let Some(notice) = &change.notice {
                println!("{}", notice);
            }
            println!(
                "{}",
                format_rows(std::slice::from_ref(&change.record), output_format)
            );
        }
    }
}
