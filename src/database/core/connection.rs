//! Database connection management
//!
//! This module provides the core database connection wrapper used by the store.

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use super::error::{Result, StoreError};
use super::schema::SchemaManager;

/// Options applied to every connection when it is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Enforce `FOREIGN KEY` constraints (grades must reference existing
    /// students and courses). Defaults to `true`.
    pub enforce_foreign_keys: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            enforce_foreign_keys: true,
        }
    }
}

impl StoreOptions {
    /// Options that leave foreign keys unchecked, so grades may reference
    /// students or courses that do not exist
    pub fn lenient() -> Self {
        Self {
            enforce_foreign_keys: false,
        }
    }
}

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration and error handling.
pub struct DatabaseConn {
    pub conn: Connection,
    options: StoreOptions,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>, options: StoreOptions) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p).map_err(|e| StoreError::StoreUnavailable {
                path: p.to_string(),
                source: e,
            })?,
            None => Connection::open_in_memory().map_err(|e| StoreError::StoreUnavailable {
                path: ":memory:".to_string(),
                source: e,
            })?,
        };

        let db = DatabaseConn { conn, options };
        db.configure()
            .map_err(|e| StoreError::StoreUnavailable {
                path: path.unwrap_or(":memory:").to_string(),
                source: e,
            })?;
        Ok(db)
    }

    /// Open an existing database file without writing to it
    ///
    /// No pragmas are applied and the schema is left as found. Used for
    /// inspection only.
    pub fn open_read_only(path: &str, options: StoreOptions) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| StoreError::StoreUnavailable {
                path: path.to_string(),
                source: e,
            })?;
        Ok(DatabaseConn { conn, options })
    }

    /// Open a database at the specified path with default options
    pub fn open_path(path: &str) -> Result<Self> {
        Self::open(Some(path), StoreOptions::default())
    }

    /// Create an in-memory database with default options
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None, StoreOptions::default())
    }

    /// Options this connection was opened with
    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Configure the connection
    ///
    /// Any failure here means the file is not a usable database (or is
    /// locked), so the caller reports it as unavailable.
    fn configure(&self) -> rusqlite::Result<()> {
        // WAL for file databases; in-memory databases report "memory"
        let mode: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        debug!("journal mode: {}", mode);

        self.conn.execute("PRAGMA synchronous=NORMAL", [])?;
        self.conn.execute("PRAGMA temp_store=MEMORY", [])?;

        let fk = if self.options.enforce_foreign_keys {
            "ON"
        } else {
            "OFF"
        };
        self.conn
            .execute(&format!("PRAGMA foreign_keys={}", fk), [])?;

        Ok(())
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| StoreError::query("execute", e))
    }

    /// Begin an unchecked transaction
    ///
    /// The transaction rolls back when dropped without `commit()`.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| StoreError::query("begin transaction", e))
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        SchemaManager::new(&self.conn).table_exists(table_name)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| StoreError::query(format!("count {}", table_name), e))?;
        Ok(count)
    }

    /// Whether `PRAGMA foreign_keys` is currently on
    pub fn foreign_keys_enabled(&self) -> Result<bool> {
        let on: i32 = self
            .conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .map_err(|e| StoreError::query("read foreign_keys pragma", e))?;
        Ok(on == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_execute() {
        let db = DatabaseConn::open_in_memory().unwrap();
        let result = db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.execute("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }

    #[test]
    fn test_foreign_key_option() {
        let strict = DatabaseConn::open(None, StoreOptions::default()).unwrap();
        assert!(strict.foreign_keys_enabled().unwrap());

        let lenient = DatabaseConn::open(None, StoreOptions::lenient()).unwrap();
        assert!(!lenient.foreign_keys_enabled().unwrap());
        assert!(!lenient.options().enforce_foreign_keys);
    }

    #[test]
    fn test_open_unwritable_path() {
        let result = DatabaseConn::open_path("/nonexistent-dir/sub/school.db");
        assert!(matches!(
            result,
            Err(StoreError::StoreUnavailable { .. })
        ));
    }

    #[test]
    fn test_open_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("school.db");
        let path = path.to_str().unwrap();

        assert!(DatabaseConn::open_read_only(path, StoreOptions::default()).is_err());

        DatabaseConn::open_path(path)
            .unwrap()
            .execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        let db = DatabaseConn::open_read_only(path, StoreOptions::default()).unwrap();
        assert!(db.table_exists("test_table").unwrap());
        assert!(db.execute("CREATE TABLE other (id INTEGER)").is_err());
    }

    #[test]
    fn test_transaction_rolls_back_on_drop() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        {
            let tx = db.transaction().unwrap();
            tx.execute("INSERT INTO test_table (id) VALUES (1)", [])
                .unwrap();
        }
        assert_eq!(db.table_count("test_table").unwrap(), 0);
    }
}
