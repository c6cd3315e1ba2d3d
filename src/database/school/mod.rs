//! School records database
//!
//! This module provides the persistent store for students, courses and
//! grades. `SchoolDatabase` owns the connection; repositories borrow it for
//! the duration of a call.

mod course;
mod grade;
mod record;
mod report;
mod student;

pub use course::{Course, CourseRepository, NewCourse};
pub use grade::{Grade, GradeRepository};
pub use record::{Record, Upserted};
pub use report::{
    ReportOrder, ReportRepository, StudentCourseRow, StudentGradeRow,
};
pub use student::{NewStudent, Student, StudentRepository};

use rusqlite::{Connection, Params};
use serde::Serialize;
use tracing::{info, warn};

use crate::database::core::{
    DatabaseConn, Result, SchemaManager, SchemaStatus, StoreError, StoreOptions, SCHEMA_VERSION,
};

/// Default database file name
pub const DEFAULT_DATABASE_FILE: &str = "school_performance.db";

/// Row counts of the three record tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub students: u64,
    pub courses: u64,
    pub grades: u64,
}

/// Access to the repositories over one connection
///
/// A session is either bound to the database connection directly (every
/// statement commits on its own) or to an open transaction created by
/// [`SchoolDatabase::transaction`].
pub struct Session<'a> {
    conn: &'a Connection,
}

impl<'a> Session<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn students(&self) -> StudentRepository<'a> {
        StudentRepository::new(self.conn)
    }

    pub fn courses(&self) -> CourseRepository<'a> {
        CourseRepository::new(self.conn)
    }

    pub fn grades(&self) -> GradeRepository<'a> {
        GradeRepository::new(self.conn)
    }

    pub fn reports(&self) -> ReportRepository<'a> {
        ReportRepository::new(self.conn)
    }

    /// Insert or replace any record by primary key
    pub fn upsert<R: Record>(&self, row: &R) -> Result<()> {
        record::upsert(self.conn, row)
    }

    /// Read any record by primary key
    pub fn fetch<R: Record, P: Params>(&self, key: P) -> Result<Option<R>> {
        record::fetch(self.conn, key)
    }

    /// Read every row of a record table
    pub fn list<R: Record>(&self) -> Result<Vec<R>> {
        record::list(self.conn)
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            students: record::count::<Student>(self.conn)?,
            courses: record::count::<Course>(self.conn)?,
            grades: record::count::<Grade>(self.conn)?,
        })
    }
}

/// Persistent school records database (SQLite backend)
///
/// `SchoolDatabase` handles:
/// - Opening or creating the database file
/// - Schema initialization and version checks
/// - Access to the record repositories and report queries
///
/// The connection closes when the handle is dropped.
pub struct SchoolDatabase {
    db: DatabaseConn,
    path: Option<String>,
}

impl SchoolDatabase {
    /// Open the database at the specified path with default options
    ///
    /// If the database doesn't exist, it will be created and initialized.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open the database at the specified path
    pub fn open_with(path: &str, options: StoreOptions) -> Result<Self> {
        let db = DatabaseConn::open(Some(path), options)?;
        Self::prepare_schema(&db, path)?;
        Ok(Self {
            db,
            path: Some(path.to_string()),
        })
    }

    /// Open the database from a data directory
    ///
    /// Uses the standard file path: `{data_dir}/school_performance.db`
    pub fn open_in_dir(data_dir: &str) -> Result<Self> {
        let path = format!("{}/{}", data_dir.trim_end_matches('/'), DEFAULT_DATABASE_FILE);
        Self::open(&path)
    }

    /// Create an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with(StoreOptions::default())
    }

    /// Create an in-memory database with custom options
    pub fn open_in_memory_with(options: StoreOptions) -> Result<Self> {
        let db = DatabaseConn::open(None, options)?;
        SchemaManager::new(&db.conn).initialize()?;
        Ok(Self { db, path: None })
    }

    fn prepare_schema(db: &DatabaseConn, path: &str) -> Result<()> {
        let schema = SchemaManager::new(&db.conn);

        let status = schema.check_status().map_err(|e| match e {
            StoreError::QueryFailure { source, .. } => StoreError::StoreUnavailable {
                path: path.to_string(),
                source,
            },
            other => other,
        })?;

        match status {
            SchemaStatus::Current => {
                info!("records database schema is current");
            }
            SchemaStatus::NotInitialized => {
                info!("initializing records database schema at {}", path);
                schema.initialize()?;
            }
            SchemaStatus::NeedsMigration { from, to } => {
                // Table definitions are created with IF NOT EXISTS, so
                // re-running initialization upgrades without touching rows
                info!("records database schema upgrade from v{} to v{}", from, to);
                schema.initialize()?;
            }
            SchemaStatus::Corrupted => {
                warn!("records database is missing tables, recreating them");
                schema.initialize()?;
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => {
                return Err(StoreError::IncompatibleSchema {
                    found: database_version,
                    required: required_version,
                });
            }
        }
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory databases
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn options(&self) -> StoreOptions {
        self.db.options()
    }

    /// Repositories over the database connection (autocommit)
    pub fn session(&self) -> Session<'_> {
        Session::new(&self.db.conn)
    }

    /// Get the student repository
    pub fn students(&self) -> StudentRepository<'_> {
        self.session().students()
    }

    /// Get the course repository
    pub fn courses(&self) -> CourseRepository<'_> {
        self.session().courses()
    }

    /// Get the grade repository
    pub fn grades(&self) -> GradeRepository<'_> {
        self.session().grades()
    }

    /// Get the report queries
    pub fn reports(&self) -> ReportRepository<'_> {
        self.session().reports()
    }

    /// Insert or replace any record by primary key
    pub fn upsert<R: Record>(&self, row: &R) -> Result<()> {
        self.session().upsert(row)
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        self.session().counts()
    }

    /// Run several operations as one atomic unit
    ///
    /// Commits when `f` returns `Ok`; any error rolls back every write made
    /// inside the closure.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Session<'_>) -> Result<T>,
    {
        let tx = self.db.transaction()?;
        let value = f(&Session::new(&tx))?;
        tx.commit()
            .map_err(|e| StoreError::query("commit transaction", e))?;
        Ok(value)
    }

    /// Schema version stored in the database
    pub fn schema_version(&self) -> Result<u32> {
        SchemaManager::new(&self.db.conn).get_schema_version()
    }

    /// Unix timestamp at which the schema version was last written
    pub fn schema_updated_at(&self) -> Result<Option<i64>> {
        SchemaManager::new(&self.db.conn).get_meta_updated_at("schema_version")
    }

    /// Get the underlying database connection (for advanced queries)
    pub fn connection(&self) -> &Connection {
        &self.db.conn
    }

    /// Whether the stored schema matches this build
    pub fn is_current(&self) -> bool {
        matches!(self.schema_version(), Ok(v) if v == SCHEMA_VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = SchoolDatabase::open_in_memory().unwrap();
        assert!(db.path().is_none());
        assert!(db.is_current());
        assert_eq!(db.counts().unwrap(), StoreCounts::default());
    }

    #[test]
    fn test_repositories_start_empty() {
        let db = SchoolDatabase::open_in_memory().unwrap();
        assert!(db.students().is_empty());
        assert!(db.courses().is_empty());
        assert!(db.grades().is_empty());
    }

    #[test]
    fn test_generic_upsert_and_fetch() {
        let db = SchoolDatabase::open_in_memory().unwrap();
        let student = Student::new(4, "Ralph Bunche", "ralph.bunche@moringa.com");
        let course = Course::new(4, "Python Programming", "Mr. White");
        let grade = Grade::new(4, 4, "A");

        db.upsert(&student).unwrap();
        db.upsert(&course).unwrap();
        db.upsert(&grade).unwrap();

        let session = db.session();
        assert_eq!(session.fetch::<Student, _>([4]).unwrap(), Some(student));
        assert_eq!(session.fetch::<Course, _>([4]).unwrap(), Some(course));
        assert_eq!(session.fetch::<Grade, _>([4, 4]).unwrap(), Some(grade));
        assert_eq!(session.list::<Grade>().unwrap().len(), 1);
    }

    #[test]
    fn test_transaction_commits() {
        let db = SchoolDatabase::open_in_memory().unwrap();

        db.transaction(|s| {
            s.students()
                .upsert(&Student::new(1, "Alice Wanja", "alice.wanja@moringa.com"))?;
            s.courses()
                .upsert(&Course::new(1, "Mathematics", "Jane Smith"))?;
            s.grades().upsert(&Grade::new(1, 1, "A"))
        })
        .unwrap();

        assert_eq!(
            db.counts().unwrap(),
            StoreCounts {
                students: 1,
                courses: 1,
                grades: 1
            }
        );
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = SchoolDatabase::open_in_memory().unwrap();

        let result = db.transaction(|s| {
            s.students()
                .upsert(&Student::new(1, "Alice Wanja", "alice.wanja@moringa.com"))?;
            // course 7 does not exist
            s.grades().upsert(&Grade::new(1, 7, "A"))
        });

        assert!(result.unwrap_err().is_constraint_violation());
        assert!(db.students().is_empty());
    }
}
