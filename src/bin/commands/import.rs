use registrar::lens::roster::{ImportArgs, Roster, RosterLens};
use registrar::lens::utils::OutputFormat;
use registrar::RegistrarConfig;

use super::{fail, open_database};

pub fn run(config: &RegistrarConfig, args: ImportArgs, output_format: OutputFormat) {
    if let Err(e) = args.validate() {
        fail(e);
    }

    let roster = match Roster::from_path(&args.file) {
        Ok(r) => r,
        Err(e) => fail(e),
    };
    if roster.is_empty() {
        eprintln!("Roster {} is empty, nothing to import", args.file.display());
        return;
    }

    let db = open_database(config);
    let summary = match RosterLens::new(&db).import(&roster) {
        Ok(s) => s,
        Err(e) => fail(format!("Import failed, no changes were made: {}", e)),
    };

    match output_format {
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing import summary: {}", e),
        },
        f if f.is_json() => match serde_json::to_string(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing import summary: {}", e),
        },
        _ => println!("{}", summary),
    }
}
