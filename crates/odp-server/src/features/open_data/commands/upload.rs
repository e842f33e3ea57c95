//! Upload command
//!
//! Validates the multipart payload and drives the ingestion pipeline under
//! the agreement's lock, so two uploads for the same agreement code cannot
//! interleave their delete/insert/upsert phases.

use odp_ingest::lock::AgreementLocks;
use odp_ingest::pipeline::{run_upload, UploadError, UploadRequest, UploadSummary};
use odp_ingest::schema::agreement_code;
use odp_ingest::store::EntryStore;

/// Command to ingest one agreement export workbook
#[derive(Debug, Clone)]
pub struct UploadOpenDataCommand {
    /// Original file name, echoed back in the summary
    pub file_name: String,

    /// Raw workbook bytes
    pub content: Vec<u8>,

    /// Full agreement label; its first token is the agreement code
    pub agreement_label: String,
}

/// Errors that can occur when uploading an agreement export
#[derive(Debug, thiserror::Error)]
pub enum UploadOpenDataError {
    #[error("A file and an agreement label are required")]
    FileRequired,

    #[error("Agreement label is required and cannot be empty")]
    AgreementRequired,

    #[error("Filename must not exceed 255 characters")]
    FilenameLength,

    #[error(transparent)]
    Pipeline(#[from] UploadError),
}

impl UploadOpenDataCommand {
    /// Validates the command parameters
    ///
    /// # Errors
    ///
    /// - Content must be non-empty
    /// - Agreement label must be non-empty after trimming
    /// - Filename must not exceed 255 characters
    pub fn validate(&self) -> Result<(), UploadOpenDataError> {
        if self.content.is_empty() {
            return Err(UploadOpenDataError::FileRequired);
        }
        if self.agreement_label.trim().is_empty() {
            return Err(UploadOpenDataError::AgreementRequired);
        }
        if self.file_name.len() > 255 {
            return Err(UploadOpenDataError::FilenameLength);
        }
        Ok(())
    }
}

/// Handler function for agreement export uploads
///
/// Takes the per-agreement lock for the whole pipeline run; uploads for
/// different agreements proceed concurrently.
#[tracing::instrument(
    skip(store, locks, command),
    fields(file = %command.file_name, agreement = %command.agreement_label)
)]
pub async fn handle<S>(
    store: &S,
    locks: &AgreementLocks,
    command: UploadOpenDataCommand,
) -> Result<UploadSummary, UploadOpenDataError>
where
    S: EntryStore + ?Sized,
{
    command.validate()?;

    let code = agreement_code(&command.agreement_label).to_string();
    let _guard = locks.acquire(&code).await;
    tracing::debug!(code = %code, "Acquired agreement lock");

    let request = UploadRequest {
        file_name: command.file_name,
        bytes: command.content,
        agreement_label: command.agreement_label,
    };

    let summary = run_upload(store, request).await?;

    tracing::info!(
        code = %summary.agreement_code,
        inserted = summary.inserted_rows,
        alerts = summary.alert_count,
        "Upload handled"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odp_ingest::store::MemoryStore;

    fn command() -> UploadOpenDataCommand {
        UploadOpenDataCommand {
            file_name: "ordenes.xlsx".to_string(),
            content: vec![1, 2, 3],
            agreement_label: "EXT-CE-2024-11 Cómputo".to_string(),
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(command().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_content() {
        let mut cmd = command();
        cmd.content = Vec::new();
        assert!(matches!(cmd.validate(), Err(UploadOpenDataError::FileRequired)));
    }

    #[test]
    fn test_validation_empty_agreement() {
        let mut cmd = command();
        cmd.agreement_label = "  ".to_string();
        assert!(matches!(cmd.validate(), Err(UploadOpenDataError::AgreementRequired)));
    }

    #[test]
    fn test_validation_filename_too_long() {
        let mut cmd = command();
        cmd.file_name = "a".repeat(256);
        assert!(matches!(cmd.validate(), Err(UploadOpenDataError::FilenameLength)));
    }

    #[tokio::test]
    async fn test_handle_propagates_pipeline_rejection() {
        // Valid command shape, but the bytes are not a workbook.
        let store = MemoryStore::new();
        let locks = AgreementLocks::new();
        let result = handle(&store, &locks, command()).await;
        assert!(matches!(
            result,
            Err(UploadOpenDataError::Pipeline(UploadError::Decode(_)))
        ));
    }
}
