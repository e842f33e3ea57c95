//! ODP Server Library
//!
//! HTTP server for the open-data procurement ingestion service.
//!
//! # Overview
//!
//! The server exposes the ingestion pipeline over a small REST surface:
//!
//! - `POST /api/v1/open-data/upload` - multipart workbook upload for one
//!   agreement; replaces the agreement's stored record set and reconciles
//!   brand alerts
//! - `POST /api/v1/open-data/reset` - clear an agreement's stored records
//! - `GET /health` - liveness plus database connectivity
//!
//! # Architecture
//!
//! Features follow a vertical-slice layout: each feature owns its
//! commands (validated data structures plus standalone `handle` functions)
//! and its Axum routes. Uploads for the same agreement code are serialized
//! in-process through a per-agreement lock registry; the pipeline itself
//! lives in `odp-ingest`.
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP framework (multipart uploads, typed extractors)
//! - **SQLx**: Postgres pool and migrations
//! - **Tower**: middleware (tracing, CORS, body limits, compression)
//!
//! # Example
//!
//! ```no_run
//! use odp_server::config::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     println!("would bind {}:{}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
