use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::database::{StoreOptions, DEFAULT_DATABASE_FILE};

pub struct RegistrarConfig {
    /// Path to the directory holding the records database
    pub data_dir: String,

    /// File name of the SQLite database inside `data_dir`
    pub database_file: String,

    /// Reject grades that reference missing students or courses (default: true)
    pub enforce_foreign_keys: bool,
}

const EMPTY_CONFIG: &str = r#"### registrar configuration file

### directory holding the records database
# data_dir = "~/.registrar"

### database file name inside data_dir
# database_file = "school_performance.db"

### reject grades for students or courses that do not exist
# enforce_foreign_keys = true
"#;

impl Default for RegistrarConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.registrar", home_dir),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            enforce_foreign_keys: true,
        }
    }
}

impl RegistrarConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<RegistrarConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.registrar/registrar.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let registrar_dir = format!("{}/.registrar", home_dir.as_str());

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(registrar_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create registrar directory: {}", e))?;
                let p = format!("{}/registrar.toml", registrar_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of REGISTRAR)
        // E.g., `REGISTRAR_DATA_DIR=/srv/school ./registrar` would set the data directory
        builder = builder.add_source(config::Environment::with_prefix("REGISTRAR"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config, &registrar_dir)
    }

    /// Build a configuration from already-loaded key/value settings
    fn from_map(config: &HashMap<String, String>, default_dir: &str) -> Result<RegistrarConfig> {
        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p),
            None => default_dir.to_string(),
        };
        std::fs::create_dir_all(data_dir.as_str())
            .map_err(|e| anyhow!("Unable to create data directory {}: {}", data_dir, e))?;

        let database_file = config
            .get("database_file")
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string());

        let enforce_foreign_keys = match config.get("enforce_foreign_keys") {
            Some(v) => parse_bool(v)
                .ok_or_else(|| anyhow!("Invalid enforce_foreign_keys value: {}", v))?,
            None => true,
        };

        Ok(RegistrarConfig {
            data_dir,
            database_file,
            enforce_foreign_keys,
        })
    }

    /// Get the path to the SQLite database file
    pub fn database_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/{}", data_dir, self.database_file)
    }

    /// Point the configuration at a specific database file
    pub fn with_database_path(mut self, path: &str) -> Self {
        let p = Path::new(path);
        if let Some(name) = p.file_name() {
            self.database_file = name.to_string_lossy().to_string();
        }
        self.data_dir = match p.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_string_lossy().to_string(),
            _ => ".".to_string(),
        };
        self
    }

    /// Connection options derived from this configuration
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            enforce_foreign_keys: self.enforce_foreign_keys,
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Data Directory:     {}", self.data_dir),
            format!("Database Path:      {}", self.database_path()),
            format!("Foreign Keys:       {}", on_off(self.enforce_foreign_keys)),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.registrar/registrar.toml", home_dir)
    }
}

fn expand_home(p: &str) -> String {
    match (p.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => format!("{}/{}", home.to_string_lossy(), rest),
        _ => p.to_string(),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn on_off(b: bool) -> &'static str {
    if b {
        "enforced"
    } else {
        "not enforced"
    }
}

/// Information about the SQLite database
#[derive(Debug, Serialize, Clone)]
pub struct DatabaseInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub schema_initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_updated: Option<String>,
    pub foreign_keys_enforced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_count: Option<u64>,
}

/// Get SQLite database information
///
/// The database is opened read-only: a missing file is not created and an
/// existing one is never initialized or upgraded by looking at it.
pub fn get_database_info(config: &RegistrarConfig) -> DatabaseInfo {
    use crate::database::{DatabaseConn, SchemaManager, SchemaStatus, SCHEMA_VERSION};

    let path = config.database_path();
    let exists = Path::new(&path).exists();
    let size_bytes = if exists {
        std::fs::metadata(&path).ok().map(|m| m.len())
    } else {
        None
    };

    let mut info = DatabaseInfo {
        path: path.clone(),
        exists,
        size_bytes,
        schema_initialized: false,
        schema_version: None,
        schema_updated: None,
        foreign_keys_enforced: config.enforce_foreign_keys,
        student_count: None,
        course_count: None,
        grade_count: None,
    };

    if !exists {
        return info;
    }

    let db = match DatabaseConn::open_read_only(&path, config.store_options()) {
        Ok(db) => db,
        Err(_) => return info,
    };
    let manager = SchemaManager::new(&db.conn);

    let (initialized, version) = match manager.check_status() {
        Ok(status) => match status {
            SchemaStatus::Current => (true, Some(SCHEMA_VERSION)),
            SchemaStatus::NeedsMigration { from, to: _ } => (true, Some(from)),
            SchemaStatus::NotInitialized => (false, None),
            SchemaStatus::Incompatible {
                database_version,
                required_version: _,
            } => (true, Some(database_version)),
            SchemaStatus::Corrupted => (false, None),
        },
        Err(_) => (false, None),
    };
    info.schema_initialized = initialized;
    info.schema_version = version;

    if initialized {
        info.schema_updated = manager
            .get_meta_updated_at("schema_version")
            .ok()
            .flatten()
            .map(|ts| {
                chrono::DateTime::from_timestamp(ts, 0)
                    .unwrap_or_default()
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
            });
    }

    // Counted for whatever tables are present, including files written
    // before the meta table existed
    let count = |table: &str| match db.table_exists(table) {
        Ok(true) => db.table_count(table).ok(),
        _ => None,
    };
    info.student_count = count("students");
    info.course_count = count("courses");
    info.grade_count = count("grades");

    info
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
