//! Persistence layer — libSQL-backed storage for student query records.

pub mod libsql_backend;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{Database, QueryRecord};
