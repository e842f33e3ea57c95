//! Upload pipeline
//!
//! Straight-line orchestration of one upload request: decode, resolve
//! headers, normalize and validate every row, then replace the agreement's
//! stored set and reconcile brand alerts. Stages never re-enter; a request
//! ends in `Done` or `Aborted` and a failed upload is re-submitted from
//! the beginning with the same file.
//!
//! The delete runs to completion before the first insert, so a crash
//! mid-upload leaves the agreement empty rather than duplicated. There is
//! no transaction around delete+insert+upsert; concurrent readers can
//! observe an empty agreement mid-upload. In-process callers serialize
//! same-agreement uploads through [`crate::lock::AgreementLocks`].

use crate::batch::write_with_fallback;
use crate::brands::derive_alerts;
use crate::header::{resolve_columns, HeaderError};
use crate::normalize::{is_blank_row, normalize_row, NormalizedRecord};
use crate::schema::{agreement_code, DATA_ROW_INDEX, HEADER_ROW_INDEX};
use crate::sheet::{decode_first_sheet, Cell, DecodeError};
use crate::store::{EntryStore, StoreError};
use crate::validate::{is_voided_order, validate_record, MAX_REPORTED_ERRORS, MAX_ROW_ERRORS};
use odp_common::checksum::sha256_hex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Records per multi-row insert/upsert statement
pub const INSERT_BATCH_SIZE: usize = 100;

/// Uploads above this size are rejected before decoding
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Stage of one upload request, for logging and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    HeaderResolved,
    Normalizing,
    Validated,
    DeletingPartition,
    Inserting,
    ReconcilingAlerts,
    Done,
    Aborted,
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::HeaderResolved => "header_resolved",
            UploadStage::Normalizing => "normalizing",
            UploadStage::Validated => "validated",
            UploadStage::DeletingPartition => "deleting_partition",
            UploadStage::Inserting => "inserting",
            UploadStage::ReconcilingAlerts => "reconciling_alerts",
            UploadStage::Done => "done",
            UploadStage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// One upload request: workbook bytes plus the agreement it belongs to
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Free-text agreement label; its first token becomes the agreement code
    pub agreement_label: String,
}

/// Row-level outcome of ingesting one sheet
///
/// Every sheet row is accounted for: `total_rows` splits into blank rows,
/// `filtered_rows`, rows behind `errors`, and `accepted_rows`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetOutcome {
    pub agreement_code: String,
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub filtered_rows: usize,
    pub inserted_rows: usize,
    pub alert_count: usize,
    /// Row validation and write-fallback diagnostics, capped at 20
    pub errors: Vec<String>,
}

/// Result summary returned to the caller of a file upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub agreement_code: String,
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub filtered_rows: usize,
    pub inserted_rows: usize,
    pub alert_count: usize,
    /// Row validation and write-fallback diagnostics, capped at 20
    pub errors: Vec<String>,
    pub file_name: String,
    pub file_size: usize,
    pub checksum: String,
}

/// Errors that reject an upload outright (no writes performed)
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Agreement label is required")]
    MissingAgreement,

    #[error("File exceeds the {0} MB upload limit")]
    FileTooLarge(usize),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("The file has too few rows; headers are expected in row 6 and data from row 7")]
    NotEnoughRows,

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("Upload aborted: {count} rows failed validation (limit {})", MAX_ROW_ERRORS)]
    TooManyRowErrors { count: usize, errors: Vec<String> },

    #[error("Failed to clear agreement '{code}': {source}")]
    ClearAgreement { code: String, source: StoreError },
}

/// Run one upload end to end against the given store
///
/// # Errors
///
/// Any [`UploadError`] means nothing was written: rejection happens before
/// the delete phase. Once the delete phase starts, write problems are
/// reported inside the summary's diagnostics instead.
#[tracing::instrument(skip(store, request), fields(file = %request.file_name, agreement = %request.agreement_label))]
pub async fn run_upload<S>(store: &S, request: UploadRequest) -> Result<UploadSummary, UploadError>
where
    S: EntryStore + ?Sized,
{
    if request.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::FileTooLarge(MAX_UPLOAD_BYTES / (1024 * 1024)));
    }

    let checksum = sha256_hex(&request.bytes);
    tracing::info!(size = request.bytes.len(), %checksum, "Processing upload");

    let grid = decode_first_sheet(&request.bytes)?;
    let outcome = ingest_sheet(store, &grid, &request.agreement_label).await?;

    Ok(UploadSummary {
        agreement_code: outcome.agreement_code,
        total_rows: outcome.total_rows,
        accepted_rows: outcome.accepted_rows,
        filtered_rows: outcome.filtered_rows,
        inserted_rows: outcome.inserted_rows,
        alert_count: outcome.alert_count,
        errors: outcome.errors,
        file_name: request.file_name,
        file_size: request.bytes.len(),
        checksum,
    })
}

/// Ingest an already-decoded first-sheet grid
///
/// The template contract applies: headers in the 6th row, data from the
/// 7th. This is the sheet-level core behind [`run_upload`]; it performs
/// all row processing and all store writes.
pub async fn ingest_sheet<S>(
    store: &S,
    grid: &[Vec<Cell>],
    agreement_label: &str,
) -> Result<SheetOutcome, UploadError>
where
    S: EntryStore + ?Sized,
{
    let mut stage = UploadStage::Received;

    let label = agreement_label.trim().to_string();
    if label.is_empty() {
        return Err(UploadError::MissingAgreement);
    }
    let code = agreement_code(&label).to_string();

    if grid.len() <= DATA_ROW_INDEX {
        return Err(UploadError::NotEnoughRows);
    }

    let columns = resolve_columns(&grid[HEADER_ROW_INDEX])?;
    advance(&mut stage, UploadStage::HeaderResolved);

    // ------------------------------------------------------------------
    // Normalize and validate every data row before touching the store.
    // ------------------------------------------------------------------
    advance(&mut stage, UploadStage::Normalizing);

    let data_rows = &grid[DATA_ROW_INDEX..];
    let total_rows = data_rows.len();
    let mut accepted: Vec<NormalizedRecord> = Vec::new();
    let mut filtered_rows = 0usize;
    let mut errors: Vec<String> = Vec::new();

    for (offset, row) in data_rows.iter().enumerate() {
        if is_blank_row(row) {
            continue;
        }

        // 1-based row number in the sheet the user is looking at.
        let sheet_row = DATA_ROW_INDEX + offset + 1;
        let record = normalize_row(row, &columns, &label, &code);

        if record.order_id().is_some_and(is_voided_order) {
            filtered_rows += 1;
            continue;
        }

        let row_errors = validate_record(&record, sheet_row);
        if !row_errors.is_empty() {
            errors.extend(row_errors);
            if errors.len() > MAX_ROW_ERRORS {
                advance(&mut stage, UploadStage::Aborted);
                let count = errors.len();
                errors.truncate(MAX_REPORTED_ERRORS);
                return Err(UploadError::TooManyRowErrors { count, errors });
            }
            continue;
        }

        accepted.push(record);
    }

    advance(&mut stage, UploadStage::Validated);
    tracing::info!(
        total_rows,
        accepted = accepted.len(),
        filtered = filtered_rows,
        row_errors = errors.len(),
        code = %code,
        "Rows validated"
    );

    // ------------------------------------------------------------------
    // Replace the agreement's stored set: delete fully, then insert.
    // ------------------------------------------------------------------
    advance(&mut stage, UploadStage::DeletingPartition);
    let deleted = store
        .delete_agreement(&code)
        .await
        .map_err(|source| UploadError::ClearAgreement {
            code: code.clone(),
            source,
        })?;
    tracing::info!(deleted, code = %code, "Cleared previous agreement records");

    advance(&mut stage, UploadStage::Inserting);
    let insert_report = write_with_fallback(
        &accepted,
        INSERT_BATCH_SIZE,
        |batch| store.insert_entries(batch),
        |record| store.insert_entry(record),
        |record| {
            format!(
                "Insert failed for order '{}'",
                record.order_id().unwrap_or("<unknown>")
            )
        },
    )
    .await;
    errors.extend(insert_report.errors);

    // ------------------------------------------------------------------
    // Reconcile alerts over everything that validated, even if some
    // primary inserts failed.
    // ------------------------------------------------------------------
    advance(&mut stage, UploadStage::ReconcilingAlerts);
    let alerts = derive_alerts(&accepted);
    let alert_report = write_with_fallback(
        &alerts,
        INSERT_BATCH_SIZE,
        |batch| store.upsert_alerts(batch),
        |alert| store.upsert_alert(alert),
        |alert| {
            format!(
                "Alert upsert failed for order '{}'",
                alert.orden_electronica
            )
        },
    )
    .await;
    errors.extend(alert_report.errors);

    advance(&mut stage, UploadStage::Done);

    errors.truncate(MAX_REPORTED_ERRORS);
    Ok(SheetOutcome {
        agreement_code: code,
        total_rows,
        accepted_rows: accepted.len(),
        filtered_rows,
        inserted_rows: insert_report.written,
        alert_count: alert_report.written,
        errors,
    })
}

/// Delete every stored entry for an agreement code without replacement
///
/// Alerts are left untouched, exactly as during an upload.
#[tracing::instrument(skip(store))]
pub async fn reset_agreement<S>(store: &S, code: &str) -> Result<u64, StoreError>
where
    S: EntryStore + ?Sized,
{
    let deleted = store.delete_agreement(code).await?;
    tracing::info!(deleted, code, "Agreement reset");
    Ok(deleted)
}

fn advance(stage: &mut UploadStage, next: UploadStage) {
    tracing::debug!(from = %stage, to = %next, "Upload stage");
    *stage = next;
}
