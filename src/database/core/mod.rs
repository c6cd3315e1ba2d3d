//! Core database infrastructure
//!
//! This module provides the foundational database components used by the store:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `SchemaManager`: Schema initialization and version checks
//! - `StoreError`: Typed errors returned by every store operation

mod connection;
mod error;
mod schema;

pub use connection::{DatabaseConn, StoreOptions};
pub use error::{Result, StoreError};
pub use schema::{SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};
