//! Store abstraction for the two ingestion datasets
//!
//! The pipeline only needs three operations from its backing store:
//! delete-by-agreement, batched entry inserts, and batched alert upserts
//! (plus the single-record forms the fallback path uses). Keeping them
//! behind a trait lets the pipeline run unchanged against Postgres in
//! production, and against [`memory::MemoryStore`] in tests and `--dry-run`
//! invocations.

pub mod memory;
pub mod postgres;

use crate::brands::AlertRecord;
use crate::normalize::NormalizedRecord;
use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgEntryStore;

/// Errors surfaced by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Backing store for agreement order entries and brand alerts
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Delete every entry stored for an agreement code, returning the count
    async fn delete_agreement(&self, code: &str) -> Result<u64, StoreError>;

    /// Insert a batch of entries; all-or-nothing per call
    async fn insert_entries(&self, entries: &[NormalizedRecord]) -> Result<(), StoreError>;

    /// Insert a single entry (fallback path after a failed batch)
    async fn insert_entry(&self, entry: &NormalizedRecord) -> Result<(), StoreError>;

    /// Upsert a batch of alerts on (orden_electronica, acuerdo_marco)
    ///
    /// An update refreshes the detection fields but must leave the
    /// externally-managed `status` untouched.
    async fn upsert_alerts(&self, alerts: &[AlertRecord]) -> Result<(), StoreError>;

    /// Upsert a single alert (fallback path after a failed batch)
    async fn upsert_alert(&self, alert: &AlertRecord) -> Result<(), StoreError>;
}
