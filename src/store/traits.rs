//! Persistence trait — async interface over the `student_queries` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::routing::Unit;

/// A finalized student submission.
///
/// Built once per session, after all three slots are filled; immutable
/// from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: Uuid,
    pub student_name: String,
    pub academic_year: String,
    pub student_query: String,
    pub routed_unit: Unit,
    pub timestamp: DateTime<Utc>,
}

/// Backend-agnostic database trait for student query records.
#[async_trait]
pub trait Database: Send + Sync {
    /// Insert a completed record.
    async fn insert_query(&self, record: &QueryRecord) -> Result<(), DatabaseError>;

    /// Get a record by ID.
    async fn get_query(&self, id: Uuid) -> Result<Option<QueryRecord>, DatabaseError>;

    /// Get the most recent records, newest first.
    async fn recent_queries(&self, limit: usize) -> Result<Vec<QueryRecord>, DatabaseError>;
}
