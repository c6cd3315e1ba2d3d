use clap::{Parser, Subcommand};
use registrar::lens::roster::ImportArgs;
use registrar::lens::utils::OutputFormat;
use registrar::RegistrarConfig;
use tracing::Level;

mod commands;

use commands::course::CourseArgs;
use commands::grade::GradeArgs;
use commands::report::ReportArgs;
use commands::student::StudentArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.registrar/registrar.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Database file to use instead of the configured one
    #[clap(long, global = true, value_name = "PATH")]
    db: Option<String>,

    /// Output format: text, table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Shortcut for --format json
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, list and show students
    Student(StudentArgs),

    /// Add and list courses
    Course(CourseArgs),

    /// Record and list grades
    Grade(GradeArgs),

    /// Grade and course reports joined with student and course names
    Report(ReportArgs),

    /// Import students, courses and grades from a JSON roster in one transaction
    Import(ImportArgs),

    /// Show the database location, schema version and row counts
    Status,
}

/// Logging is off unless `--debug` is given, which shows everything down to DEBUG
fn log_level(debug: bool) -> Option<Level> {
    debug.then_some(Level::DEBUG)
}

fn main() {
    let cli = Cli::parse();

    if let Some(level) = log_level(cli.debug) {
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    let config = match RegistrarConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    let config = match &cli.db {
        Some(path) => config.with_database_path(path),
        None => config,
    };

    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        cli.format
    };

    match cli.command {
        Commands::Student(args) => commands::student::run(&config, args, output_format),
        Commands::Course(args) => commands::course::run(&config, args, output_format),
        Commands::Grade(args) => commands::grade::run(&config, args, output_format),
        Commands::Report(args) => commands::report::run(&config, args, output_format),
        Commands::Import(args) => commands::import::run(&config, args, output_format),
        Commands::Status => commands::status::run(&config, output_format),
    }
}
