//! Feature modules implementing the ODP API
//!
//! Each feature is a vertical slice with its own commands (validated data
//! structures plus standalone `handle` functions) and routes.
//!
//! # Features
//!
//! - **open_data**: agreement export uploads and agreement resets

pub mod open_data;

use axum::Router;
use odp_ingest::lock::AgreementLocks;
use odp_ingest::store::PgEntryStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Postgres-backed store used by the ingestion pipeline
    pub store: PgEntryStore,
    /// Per-agreement locks serializing same-agreement uploads in-process
    pub locks: AgreementLocks,
}

impl FeatureState {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            store: PgEntryStore::new(pool),
            locks: AgreementLocks::new(),
        }
    }
}

/// Creates the main API router with all feature routes mounted
///
/// # Arguments
///
/// * `state` - Shared state containing the store and the lock registry
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest(
        "/open-data",
        open_data::open_data_routes().with_state(state),
    )
}
