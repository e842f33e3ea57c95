//! Write operations for the open-data feature

pub mod reset;
pub mod upload;

pub use reset::{ResetAgreementCommand, ResetAgreementError, ResetAgreementResponse};
pub use upload::{UploadOpenDataCommand, UploadOpenDataError};
