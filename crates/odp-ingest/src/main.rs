//! ODP Ingest - agreement export ingestion tool

use anyhow::{Context, Result};
use clap::Parser;
use odp_common::logging::{init_logging, LogConfig, LogLevel};
use odp_ingest::cli::{Cli, Command};
use odp_ingest::pipeline::{reset_agreement, run_upload, UploadRequest};
use odp_ingest::store::{MemoryStore, PgEntryStore};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("odp-ingest".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    match cli.command {
        Command::Upload {
            file,
            agreement,
            dry_run,
            database_url,
        } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let request = UploadRequest {
                file_name: file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.display().to_string()),
                bytes,
                agreement_label: agreement,
            };

            let summary = if dry_run {
                info!("Dry run: using in-memory store, nothing will be written");
                run_upload(&MemoryStore::new(), request).await?
            } else {
                let store = connect(database_url).await?;
                run_upload(&store, request).await?
            };

            info!(
                agreement = %summary.agreement_code,
                total_rows = summary.total_rows,
                accepted = summary.accepted_rows,
                filtered = summary.filtered_rows,
                inserted = summary.inserted_rows,
                alerts = summary.alert_count,
                checksum = %summary.checksum,
                "Upload complete"
            );
            for error in &summary.errors {
                tracing::warn!(%error, "Row diagnostic");
            }
        },
        Command::Reset { code, database_url } => {
            let store = connect(database_url).await?;
            let deleted = reset_agreement(&store, &code).await?;
            info!(deleted, code = %code, "Reset complete");
        },
    }

    Ok(())
}

async fn connect(database_url: Option<String>) -> Result<PgEntryStore> {
    let url = database_url.context("DATABASE_URL is required unless --dry-run is set")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .context("Failed to connect to database")?;
    Ok(PgEntryStore::new(pool))
}
