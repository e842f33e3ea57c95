//! Command-line interface definition
//!
//! Lives in the library so `cargo xtask generate-cli-docs` can derive the
//! command reference from the same clap definitions the binary parses.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "odp-ingest")]
#[command(author, version, about = "ODP agreement export ingestion tool")]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
pub enum Command {
    /// Ingest an agreement export workbook
    Upload {
        /// Path to the .xlsx/.xls export
        #[arg(short, long)]
        file: PathBuf,

        /// Full agreement label; its first token is the agreement code
        #[arg(short, long)]
        agreement: String,

        /// Run the full pipeline against an in-memory store, writing nothing
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Postgres connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },

    /// Delete every stored entry for an agreement code
    Reset {
        /// Agreement code (e.g. EXT-CE-2024-11)
        #[arg(short, long)]
        code: String,

        /// Postgres connection string
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upload_args_parse() {
        let cli = Cli::parse_from([
            "odp-ingest",
            "upload",
            "--file",
            "ordenes.xlsx",
            "--agreement",
            "EXT-CE-2024-11 Cómputo",
            "--dry-run",
        ]);
        match cli.command {
            Command::Upload { file, agreement, dry_run, .. } => {
                assert_eq!(file, PathBuf::from("ordenes.xlsx"));
                assert_eq!(agreement, "EXT-CE-2024-11 Cómputo");
                assert!(dry_run);
            },
            other => panic!("expected upload, got {:?}", other),
        }
    }
}
