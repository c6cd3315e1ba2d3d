//! Store error types
//!
//! Every database operation returns [`StoreError`] so callers can tell an
//! unreachable database apart from a rejected write or a failed read.

use rusqlite::ErrorCode;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot open database at '{path}': {source}")]
    StoreUnavailable {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database schema v{found} is newer than supported v{required}")]
    IncompatibleSchema { found: u32, required: u32 },

    #[error("Constraint violation on {table}: {message}")]
    ConstraintViolation { table: String, message: String },

    #[error("Query failed ({context}): {source}")]
    QueryFailure {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    /// Classify an error raised while writing to `table`
    ///
    /// SQLite constraint failures (UNIQUE, FOREIGN KEY, NOT NULL) become
    /// [`StoreError::ConstraintViolation`]; anything else is a query failure.
    pub fn from_write(table: &str, err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref msg)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::ConstraintViolation {
                    table: table.to_string(),
                    message: msg.clone().unwrap_or_else(|| code.to_string()),
                }
            }
            other => StoreError::QueryFailure {
                context: format!("write to {}", table),
                source: other,
            },
        }
    }

    /// Wrap a read or schema error with a short description of what was attempted
    pub fn query(context: impl Into<String>, err: rusqlite::Error) -> Self {
        StoreError::QueryFailure {
            context: context.into(),
            source: err,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_unique_failure_is_constraint_violation() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, email TEXT UNIQUE NOT NULL);
             INSERT INTO t (id, email) VALUES (1, 'a@example.com');",
        )
        .unwrap();

        let err = conn
            .execute("INSERT INTO t (id, email) VALUES (2, 'a@example.com')", [])
            .unwrap_err();
        let err = StoreError::from_write("t", err);
        assert!(err.is_constraint_violation());
        assert!(err.to_string().contains("t"));
    }

    #[test]
    fn test_other_failure_is_query_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let err = conn
            .execute("INSERT INTO missing_table VALUES (1)", [])
            .unwrap_err();
        let err = StoreError::from_write("missing_table", err);
        assert!(matches!(err, StoreError::QueryFailure { .. }));
    }
}
