//! libSQL backend — async `Database` trait implementation.
//!
//! Supports local file and in-memory databases plus a remote connection
//! (URL + auth token) for a hosted libSQL instance.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::routing::Unit;
use crate::store::traits::{Database, QueryRecord};

const QUERY_COLUMNS: &str =
    "id, student_name, academic_year, student_query, routed_unit, timestamp";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run schema init.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_db(db)?;
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_db(db)?;
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Connect to a remote libSQL instance by URL and auth token.
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_remote(url.clone(), auth_token)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to connect to {url}: {e}")))?;

        let backend = Self::from_db(db)?;
        backend.init_schema().await?;
        info!(url = %url, "Remote database connected");
        Ok(backend)
    }

    fn from_db(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Create the `student_queries` table if needed. Idempotent.
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        self.conn()
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS student_queries (
                    id TEXT PRIMARY KEY,
                    student_name TEXT NOT NULL,
                    academic_year TEXT NOT NULL,
                    student_query TEXT NOT NULL,
                    routed_unit TEXT NOT NULL,
                    timestamp TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_student_queries_unit
                    ON student_queries(routed_unit);
                CREATE INDEX IF NOT EXISTS idx_student_queries_timestamp
                    ON student_queries(timestamp);",
            )
            .await
            .map_err(|e| DatabaseError::Migration(format!("init_schema: {e}")))?;
        Ok(())
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 datetime string from the DB.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse a unit key from the DB. Unknown values map to general inquiries.
fn str_to_unit(s: &str) -> Unit {
    match s {
        "admission_scholarship" => Unit::AdmissionScholarship,
        "academic_support" => Unit::AcademicSupport,
        "student_welfare" => Unit::StudentWelfare,
        "career_skill_development" => Unit::CareerSkillDevelopment,
        _ => Unit::GeneralInquiries,
    }
}

/// Map a libsql row to a QueryRecord. Column order matches QUERY_COLUMNS.
fn row_to_record(row: &libsql::Row) -> Result<QueryRecord, libsql::Error> {
    let id_str: String = row.get(0)?;
    let student_name: String = row.get(1)?;
    let academic_year: String = row.get(2)?;
    let student_query: String = row.get(3)?;
    let unit_str: String = row.get(4)?;
    let timestamp_str: String = row.get(5)?;

    Ok(QueryRecord {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        student_name,
        academic_year,
        student_query,
        routed_unit: str_to_unit(&unit_str),
        timestamp: parse_datetime(&timestamp_str),
    })
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn insert_query(&self, record: &QueryRecord) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO student_queries (id, student_name, academic_year, student_query, routed_unit, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id.to_string(),
                    record.student_name.clone(),
                    record.academic_year.clone(),
                    record.student_query.clone(),
                    record.routed_unit.as_str(),
                    record.timestamp.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_query: {e}")))?;

        debug!(record_id = %record.id, unit = %record.routed_unit, "Query record inserted");
        Ok(())
    }

    async fn get_query(&self, id: Uuid) -> Result<Option<QueryRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {QUERY_COLUMNS} FROM student_queries WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_query: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let record = row_to_record(&row)
                    .map_err(|e| DatabaseError::Query(format!("get_query row parse: {e}")))?;
                Ok(Some(record))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_query: {e}"))),
        }
    }

    async fn recent_queries(&self, limit: usize) -> Result<Vec<QueryRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {QUERY_COLUMNS} FROM student_queries ORDER BY timestamp DESC LIMIT ?1"
                ),
                params![limit as i64],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("recent_queries: {e}")))?;

        let mut records = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_record(&row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping query row: {e}");
                }
            }
        }
        Ok(records)
    }
}
