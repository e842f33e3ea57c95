//! Reset command
//!
//! Clears every stored entry for one agreement code without uploading a
//! replacement. Brand alerts are deliberately left alone, mirroring upload
//! semantics: the follow-up workflow history must survive.

use odp_ingest::lock::AgreementLocks;
use odp_ingest::pipeline::reset_agreement;
use odp_ingest::store::{EntryStore, StoreError};
use serde::{Deserialize, Serialize};

/// Command to clear an agreement's stored entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetAgreementCommand {
    /// Agreement code (e.g. `EXT-CE-2024-11`)
    pub code: String,
}

/// Response from resetting an agreement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetAgreementResponse {
    pub code: String,
    pub deleted: u64,
}

/// Errors that can occur when resetting an agreement
#[derive(Debug, thiserror::Error)]
pub enum ResetAgreementError {
    #[error("Agreement code is required and cannot be empty")]
    CodeRequired,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ResetAgreementCommand {
    /// Validates the command parameters
    pub fn validate(&self) -> Result<(), ResetAgreementError> {
        if self.code.trim().is_empty() {
            return Err(ResetAgreementError::CodeRequired);
        }
        Ok(())
    }
}

/// Handler function for agreement resets
#[tracing::instrument(skip(store, locks), fields(code = %command.code))]
pub async fn handle<S>(
    store: &S,
    locks: &AgreementLocks,
    command: ResetAgreementCommand,
) -> Result<ResetAgreementResponse, ResetAgreementError>
where
    S: EntryStore + ?Sized,
{
    command.validate()?;

    let code = command.code.trim().to_string();
    let _guard = locks.acquire(&code).await;

    let deleted = reset_agreement(store, &code).await?;

    Ok(ResetAgreementResponse { code, deleted })
}
