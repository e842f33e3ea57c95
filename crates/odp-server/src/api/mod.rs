//! API response types and helpers

pub mod response;

pub use response::{ApiResponse, ErrorResponse};
