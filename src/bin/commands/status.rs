use registrar::lens::utils::OutputFormat;
use registrar::{format_size, get_database_info, DatabaseInfo, RegistrarConfig};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatusInfo {
    config_file: String,
    data_dir: String,
    database: DatabaseInfo,
}

pub fn run(config: &RegistrarConfig, output_format: OutputFormat) {
    let status = StatusInfo {
        config_file: RegistrarConfig::config_file_path(),
        data_dir: config.data_dir.clone(),
        database: get_database_info(config),
    };

    match output_format {
        OutputFormat::Json | OutputFormat::JsonLine => match serde_json::to_string(&status) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing status: {}", e),
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(&status) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing status: {}", e),
        },
        // Every other format uses the same human-readable layout
        _ => print_status(&status),
    }
}

fn print_status(info: &StatusInfo) {
    println!("Registrar Status");
    println!("================\n");

    println!("General:");
    println!("  Config file:    {}", info.config_file);
    println!("  Data dir:       {}", info.data_dir);
    println!();

    let db = &info.database;
    println!("Records Database:");
    println!("  Path:           {}", db.path);
    println!(
        "  Status:         {}",
        if db.exists { "exists" } else { "not created" }
    );
    if let Some(size) = db.size_bytes {
        println!("  Size:           {}", format_size(size));
    }
    println!(
        "  Schema:         {}",
        if db.schema_initialized {
            format!("initialized (v{})", db.schema_version.unwrap_or(0))
        } else {
            "not initialized".to_string()
        }
    );
    if let Some(updated) = &db.schema_updated {
        println!("  Schema updated: {}", updated);
    }
    println!(
        "  Foreign keys:   {}",
        if db.foreign_keys_enforced {
            "enforced"
        } else {
            "not enforced"
        }
    );
    if let Some(count) = db.student_count {
        println!("  Students:       {}", count);
    }
    if let Some(count) = db.course_count {
        println!("  Courses:        {}", count);
    }
    if let Some(count) = db.grade_count {
        println!("  Grades:         {}", count);
    }
}
