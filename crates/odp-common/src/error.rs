//! Error types for ODP

use thiserror::Error;

/// Result type alias for ODP operations
pub type Result<T> = std::result::Result<T, OdpError>;

/// Main error type for ODP
#[derive(Error, Debug)]
pub enum OdpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Workbook decode error: {0}")]
    Decode(String),

    #[error("Agreement not found: {0}")]
    AgreementNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
