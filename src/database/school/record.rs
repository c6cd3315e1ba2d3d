//! Generic table access
//!
//! [`Record`] describes how a Rust struct maps onto one table. The free
//! functions in this module build the SQL for any such table, so the typed
//! repositories only add the queries that are specific to them.

use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, Params, Row};
use serde::Serialize;

use crate::database::core::{Result, StoreError};

/// A row type stored in a single table
///
/// `COLUMNS` lists every column in the order produced by [`Record::values`]
/// and consumed by [`Record::from_row`]. `KEY_COLUMNS` is the primary key
/// and must be a subset of `COLUMNS`.
pub trait Record: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    const KEY_COLUMNS: &'static [&'static str];

    /// Column values in `COLUMNS` order
    fn values(&self) -> Vec<&dyn ToSql>;

    /// Build a record from a row selected with `COLUMNS`
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Check field-level rules before a write
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Outcome of an insert-if-absent operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "record", rename_all = "lowercase")]
pub enum Upserted<T> {
    /// No row with the unique key existed; this is the new row
    Inserted(T),
    /// A row with the unique key already existed and was left unchanged
    Existing(T),
}

impl<T> Upserted<T> {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Upserted::Inserted(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Upserted::Inserted(v) | Upserted::Existing(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Upserted::Inserted(v) | Upserted::Existing(v) => v,
        }
    }
}

/// Reject empty (or whitespace-only) required text
pub(crate) fn require_text(table: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidRecord(format!(
            "{}.{} must not be empty",
            table, field
        )));
    }
    Ok(())
}

/// `SELECT <columns> FROM <table>`
pub(crate) fn select_sql<R: Record>() -> String {
    format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

/// `WHERE k1 = ?1 AND k2 = ?2 ...` over the primary key
fn key_clause<R: Record>() -> String {
    R::KEY_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col, i + 1))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Insert, or overwrite every non-key column when the primary key exists
///
/// Conflicts on other unique columns are not resolved and surface as
/// constraint violations.
pub(crate) fn upsert_sql<R: Record>() -> String {
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    let updates: Vec<String> = R::COLUMNS
        .iter()
        .filter(|c| !R::KEY_COLUMNS.contains(*c))
        .map(|c| format!("{} = excluded.{}", c, c))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders.join(", "),
        R::KEY_COLUMNS.join(", "),
        updates.join(", ")
    )
}

/// Insert or fully replace `row` by primary key
pub fn upsert<R: Record>(conn: &Connection, row: &R) -> Result<()> {
    row.validate()?;
    let sql = upsert_sql::<R>();
    conn.execute(&sql, row.values().as_slice())
        .map_err(|e| StoreError::from_write(R::TABLE, e))?;
    Ok(())
}

/// Read one row by primary key
pub fn fetch<R: Record, P: Params>(conn: &Connection, key: P) -> Result<Option<R>> {
    let sql = format!("{} WHERE {}", select_sql::<R>(), key_clause::<R>());
    conn.query_row(&sql, key, |row| R::from_row(row))
        .optional()
        .map_err(|e| StoreError::query(format!("fetch from {}", R::TABLE), e))
}

/// Read rows matching an optional filter, in storage order
pub(crate) fn select_where<R: Record, P: Params>(
    conn: &Connection,
    filter: Option<&str>,
    params: P,
) -> Result<Vec<R>> {
    let sql = match filter {
        Some(f) => format!("{} WHERE {}", select_sql::<R>(), f),
        None => select_sql::<R>(),
    };
    let context = || format!("select from {}", R::TABLE);

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StoreError::query(context(), e))?;
    let rows = stmt
        .query_map(params, |row| R::from_row(row))
        .map_err(|e| StoreError::query(context(), e))?;

    let records = rows
        .collect::<rusqlite::Result<Vec<R>>>()
        .map_err(|e| StoreError::query(context(), e))?;
    Ok(records)
}

/// Read every row of the table, in storage order
pub fn list<R: Record>(conn: &Connection) -> Result<Vec<R>> {
    select_where::<R, _>(conn, None, [])
}

/// Number of rows in the table
pub fn count<R: Record>(conn: &Connection) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
    conn.query_row(&sql, [], |row| row.get(0))
        .map_err(|e| StoreError::query(format!("count {}", R::TABLE), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::school::{Course, Grade, Student};

    #[test]
    fn test_upsert_sql_updates_non_key_columns() {
        let sql = upsert_sql::<Grade>();
        assert_eq!(
            sql,
            "INSERT INTO grades (student_id, course_id, grade) VALUES (?1, ?2, ?3) \
             ON CONFLICT (student_id, course_id) DO UPDATE SET grade = excluded.grade"
        );

        let sql = upsert_sql::<Student>();
        assert!(sql.contains("ON CONFLICT (student_id)"));
        assert!(sql.contains("student_name = excluded.student_name"));
        assert!(sql.contains("student_email = excluded.student_email"));
        assert!(!sql.contains("student_id = excluded.student_id"));
    }

    #[test]
    fn test_select_sql() {
        assert_eq!(
            select_sql::<Course>(),
            "SELECT course_id, course_name, course_teacher FROM courses"
        );
        assert_eq!(key_clause::<Grade>(), "student_id = ?1 AND course_id = ?2");
    }

    #[test]
    fn test_require_text() {
        assert!(require_text("students", "student_name", "Ada").is_ok());
        assert!(matches!(
            require_text("students", "student_name", "   "),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_upserted_accessors() {
        let inserted = Upserted::Inserted(1);
        assert!(inserted.is_inserted());
        assert_eq!(*inserted.get(), 1);

        let existing = Upserted::Existing(2);
        assert!(!existing.is_inserted());
        assert_eq!(existing.into_inner(), 2);
    }
}
