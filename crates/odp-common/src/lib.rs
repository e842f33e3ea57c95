//! ODP Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling, logging bootstrap and checksum utilities for the
//! ODP workspace.
//!
//! # Overview
//!
//! This crate provides the functionality used across all ODP workspace
//! members:
//!
//! - **Error Handling**: the shared `OdpError` type and result alias
//! - **Logging**: `tracing` subscriber initialization with env overrides
//! - **Checksums**: content integrity hashing for uploaded files
//!
//! # Example
//!
//! ```no_run
//! use odp_common::{Result, OdpError};
//! use odp_common::checksum::sha256_hex;
//!
//! fn fingerprint(bytes: &[u8]) -> Result<String> {
//!     Ok(sha256_hex(bytes))
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{OdpError, Result};
