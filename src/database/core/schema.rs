//! Database schema management
//!
//! This module provides schema definitions and management for the school
//! records database. All tables are defined here so that joins across
//! students, courses and grades always agree on column names.

use rusqlite::Connection;
use tracing::debug;

use super::error::{Result, StoreError};

/// Current schema version
/// Increment this when making breaking schema changes
pub const SCHEMA_VERSION: u32 = 1;

/// Schema definitions for all tables in the records database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// SQL for creating the meta table (tracks schema version)
    pub const META_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS registrar_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );
    "#;

    pub const STUDENTS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS students (
            student_id INTEGER PRIMARY KEY,
            student_name TEXT NOT NULL,
            student_email TEXT UNIQUE NOT NULL
        );
    "#;

    pub const COURSES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS courses (
            course_id INTEGER PRIMARY KEY,
            course_name TEXT NOT NULL,
            course_teacher TEXT NOT NULL
        );
    "#;

    /// Grades reference both parents; enforcement depends on `PRAGMA foreign_keys`
    pub const GRADES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS grades (
            student_id INTEGER NOT NULL,
            course_id INTEGER NOT NULL,
            grade TEXT NOT NULL,
            PRIMARY KEY (student_id, course_id),
            FOREIGN KEY (student_id) REFERENCES students (student_id),
            FOREIGN KEY (course_id) REFERENCES courses (course_id)
        );
    "#;

    /// SQL for creating grade indexes (the primary key already covers student_id)
    pub const GRADES_INDEXES: &'static [&'static str] =
        &["CREATE INDEX IF NOT EXISTS idx_grades_course_id ON grades(course_id)"];

    /// Tables that must exist for the schema to be usable
    pub const REQUIRED_TABLES: &'static [&'static str] =
        &["registrar_meta", "students", "courses", "grades"];
}

/// Schema manager for the records database
///
/// Handles schema initialization and version checking.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Initialize the database schema
    ///
    /// Creates all tables and indexes if they don't exist and stamps the
    /// schema version. Safe to call on an already initialized database;
    /// existing rows are left untouched.
    pub fn initialize(&self) -> Result<()> {
        let tables = [
            ("registrar_meta", SchemaDefinitions::META_TABLE),
            ("students", SchemaDefinitions::STUDENTS_TABLE),
            ("courses", SchemaDefinitions::COURSES_TABLE),
            ("grades", SchemaDefinitions::GRADES_TABLE),
        ];

        for (name, sql) in tables {
            self.conn
                .execute(sql, [])
                .map_err(|e| StoreError::query(format!("create {} table", name), e))?;
        }

        for index_sql in SchemaDefinitions::GRADES_INDEXES {
            self.conn
                .execute(index_sql, [])
                .map_err(|e| StoreError::query("create grades index", e))?;
        }

        self.set_meta("schema_version", &SCHEMA_VERSION.to_string())?;
        debug!("schema initialized at v{}", SCHEMA_VERSION);

        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> Result<SchemaStatus> {
        if !self.table_exists("registrar_meta")? {
            return Ok(SchemaStatus::NotInitialized);
        }

        let current_version = self.get_schema_version()?;

        if current_version == SCHEMA_VERSION {
            if self.verify_integrity()? {
                Ok(SchemaStatus::Current)
            } else {
                Ok(SchemaStatus::Corrupted)
            }
        } else if current_version < SCHEMA_VERSION {
            Ok(SchemaStatus::NeedsMigration {
                from: current_version,
                to: SCHEMA_VERSION,
            })
        } else {
            // Database is from a newer version
            Ok(SchemaStatus::Incompatible {
                database_version: current_version,
                required_version: SCHEMA_VERSION,
            })
        }
    }

    /// Get the current schema version from the database
    ///
    /// A meta table without a version row counts as version 0.
    pub fn get_schema_version(&self) -> Result<u32> {
        let version = self.get_meta("schema_version")?;
        match version {
            Some(v) => v.parse().map_err(|_| {
                StoreError::InvalidRecord(format!("invalid schema version '{}'", v))
            }),
            None => Ok(0),
        }
    }

    /// Verify schema integrity by checking required tables exist
    fn verify_integrity(&self) -> Result<bool> {
        for table in SchemaDefinitions::REQUIRED_TABLES {
            if !self.table_exists(table)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let exists: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::query("check table existence", e))?;
        Ok(exists > 0)
    }

    /// Set a metadata value
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO registrar_meta (key, value, updated_at) VALUES (?1, ?2, strftime('%s', 'now'))",
                [key, value],
            )
            .map_err(|e| StoreError::query("set meta value", e))?;
        Ok(())
    }

    /// Get a metadata value
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let result: rusqlite::Result<String> = self.conn.query_row(
            "SELECT value FROM registrar_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::query("get meta value", e)),
        }
    }

    /// Unix timestamp of the last write to a metadata key
    pub fn get_meta_updated_at(&self, key: &str) -> Result<Option<i64>> {
        let result: rusqlite::Result<i64> = self.conn.query_row(
            "SELECT updated_at FROM registrar_meta WHERE key = ?1",
            [key],
            |row| row.get(0),
        );

        match result {
            Ok(ts) => Ok(Some(ts)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::query("get meta timestamp", e)),
        }
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database is not initialized (fresh database)
    NotInitialized,

    /// Schema is current and valid
    Current,

    /// Schema needs migration from an older version
    NeedsMigration { from: u32, to: u32 },

    /// Database is from a newer version (incompatible)
    Incompatible {
        database_version: u32,
        required_version: u32,
    },

    /// Some required tables are missing
    Corrupted,
}
