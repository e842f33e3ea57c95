//! ODP Ingest Library
//!
//! Tolerant spreadsheet-to-relational ingestion for framework-agreement
//! ("acuerdo marco") procurement exports.
//!
//! # Pipeline
//!
//! An upload moves through a fixed sequence of stages:
//!
//! 1. **Header resolution** - locate the template's header row and build a
//!    tolerant column map from the canonical field vocabulary
//! 2. **Row normalization** - coerce each raw row into a typed record
//!    (dates, amounts, trimmed strings) with sentinel defaults
//! 3. **Filtering and validation** - drop voided order lines, reject rows
//!    missing required fields, abort on structurally broken files
//! 4. **Replace-and-insert** - supersede the agreement's stored record set
//! 5. **Alert reconciliation** - upsert brand-watch alerts by natural key
//!
//! # Example
//!
//! ```no_run
//! use odp_ingest::pipeline::{run_upload, UploadRequest};
//! use odp_ingest::store::postgres::PgEntryStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = sqlx::PgPool::connect("postgresql://localhost/odp").await?;
//!     let store = PgEntryStore::new(pool);
//!     let request = UploadRequest {
//!         file_name: "ordenes.xlsx".to_string(),
//!         bytes: std::fs::read("ordenes.xlsx")?,
//!         agreement_label: "EXT-CE-2024-11 Catálogo de Cómputo".to_string(),
//!     };
//!     let summary = run_upload(&store, request).await?;
//!     println!("{} rows inserted", summary.inserted_rows);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod brands;
pub mod cli;
pub mod header;
pub mod lock;
pub mod normalize;
pub mod pipeline;
pub mod schema;
pub mod sheet;
pub mod store;
pub mod validate;

pub use pipeline::{run_upload, UploadError, UploadRequest, UploadSummary};
