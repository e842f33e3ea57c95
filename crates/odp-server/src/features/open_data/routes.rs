//! Open-data API routes
//!
//! Wires the upload and reset commands to Axum HTTP handlers.
//!
//! # Route Structure
//!
//! - `POST /api/v1/open-data/upload` - multipart upload (`file` +
//!   `acuerdo_marco` fields) for one agreement export
//! - `POST /api/v1/open-data/reset` - clear an agreement's stored entries

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use odp_ingest::pipeline::UploadError;
use serde_json::json;

use super::commands::{
    reset, upload, ResetAgreementCommand, ResetAgreementError, UploadOpenDataCommand,
    UploadOpenDataError,
};

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the open-data router with all routes configured
pub fn open_data_routes() -> Router<FeatureState> {
    Router::new()
        .route("/upload", post(upload_open_data))
        .route("/reset", post(reset_agreement))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Ingest one agreement export workbook
///
/// # Endpoint
///
/// `POST /api/v1/open-data/upload`
///
/// # Request
///
/// `multipart/form-data` with two fields:
/// - `file` - the .xlsx/.xls export
/// - `acuerdo_marco` - full agreement label (first token = agreement code)
///
/// # Response
///
/// - `200 OK` - summary with row accounting and up to 20 diagnostics
/// - `400 Bad Request` - missing fields, undecodable file, missing columns
/// - `413 Payload Too Large` - file above the upload limit
/// - `422 Unprocessable Entity` - row-error ceiling exceeded, nothing written
/// - `500 Internal Server Error` - store failure while clearing the agreement
#[tracing::instrument(skip(state, multipart))]
async fn upload_open_data(
    State(state): State<FeatureState>,
    multipart: Multipart,
) -> Result<Response, OpenDataApiError> {
    let command = read_upload_form(multipart).await?;

    let summary = upload::handle(&state.store, &state.locks, command).await?;

    tracing::info!(
        code = %summary.agreement_code,
        inserted = summary.inserted_rows,
        "Upload processed via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(summary))).into_response())
}

/// Clear an agreement's stored entries
///
/// # Endpoint
///
/// `POST /api/v1/open-data/reset`
///
/// # Request Body
///
/// ```json
/// { "code": "EXT-CE-2024-11" }
/// ```
///
/// # Response
///
/// - `200 OK` - number of deleted entries
/// - `400 Bad Request` - empty code
/// - `500 Internal Server Error` - store failure
#[tracing::instrument(skip(state, command), fields(code = %command.code))]
async fn reset_agreement(
    State(state): State<FeatureState>,
    Json(command): Json<ResetAgreementCommand>,
) -> Result<Response, OpenDataApiError> {
    let response = reset::handle(&state.store, &state.locks, command).await?;

    tracing::info!(
        code = %response.code,
        deleted = response.deleted,
        "Agreement reset via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Pull the upload command out of the multipart form
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadOpenDataCommand, OpenDataApiError> {
    let mut file_name = None;
    let mut content = None;
    let mut agreement_label = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OpenDataApiError::Multipart(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| OpenDataApiError::Multipart(e.to_string()))?;
                content = Some(bytes.to_vec());
            },
            Some("acuerdo_marco") | Some("agreement") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| OpenDataApiError::Multipart(e.to_string()))?;
                agreement_label = Some(text);
            },
            _ => {},
        }
    }

    Ok(UploadOpenDataCommand {
        file_name: file_name.unwrap_or_else(|| "upload.xlsx".to_string()),
        content: content.unwrap_or_default(),
        agreement_label: agreement_label.unwrap_or_default(),
    })
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for open-data API endpoints
#[derive(Debug)]
enum OpenDataApiError {
    Multipart(String),
    UploadError(UploadOpenDataError),
    ResetError(ResetAgreementError),
}

impl From<UploadOpenDataError> for OpenDataApiError {
    fn from(err: UploadOpenDataError) -> Self {
        Self::UploadError(err)
    }
}

impl From<ResetAgreementError> for OpenDataApiError {
    fn from(err: ResetAgreementError) -> Self {
        Self::ResetError(err)
    }
}

impl IntoResponse for OpenDataApiError {
    fn into_response(self) -> Response {
        match self {
            OpenDataApiError::Multipart(message) => {
                let error = ErrorResponse::new("BAD_MULTIPART", message);
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },

            // Command-level validation
            OpenDataApiError::UploadError(UploadOpenDataError::FileRequired)
            | OpenDataApiError::UploadError(UploadOpenDataError::AgreementRequired)
            | OpenDataApiError::UploadError(UploadOpenDataError::FilenameLength) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },

            // Pipeline rejections, mapped by kind
            OpenDataApiError::UploadError(UploadOpenDataError::Pipeline(err)) => {
                pipeline_error_response(err)
            },

            // Reset errors
            OpenDataApiError::ResetError(ResetAgreementError::CodeRequired) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            OpenDataApiError::ResetError(ResetAgreementError::Store(_)) => {
                tracing::error!("Store error during agreement reset: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

fn pipeline_error_response(err: UploadError) -> Response {
    match err {
        UploadError::FileTooLarge(_) => {
            let error = ErrorResponse::new("FILE_TOO_LARGE", err.to_string());
            (StatusCode::PAYLOAD_TOO_LARGE, Json(error)).into_response()
        },
        UploadError::TooManyRowErrors { count, ref errors } => {
            let error = ErrorResponse::with_details(
                "TOO_MANY_ROW_ERRORS",
                err.to_string(),
                json!({ "errorCount": count, "errors": errors }),
            );
            (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
        },
        UploadError::ClearAgreement { .. } => {
            tracing::error!("Store error while clearing agreement: {}", err);
            let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        },
        UploadError::MissingAgreement
        | UploadError::Decode(_)
        | UploadError::NotEnoughRows
        | UploadError::Header(_) => {
            let error = ErrorResponse::new("VALIDATION_ERROR", err.to_string());
            (StatusCode::BAD_REQUEST, Json(error)).into_response()
        },
    }
}

impl std::fmt::Display for OpenDataApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multipart(message) => write!(f, "Invalid multipart request: {}", message),
            Self::UploadError(e) => write!(f, "{}", e),
            Self::ResetError(e) => write!(f, "{}", e),
        }
    }
}
