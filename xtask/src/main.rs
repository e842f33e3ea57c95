//! Build automation tasks for ODP
//!
//! This tool provides various automation tasks for the ODP project, including:
//! - Generating CLI documentation from source code
//! - Future build-related tasks

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for ODP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate CLI documentation in Markdown format
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    // Generate markdown from clap definitions
    let markdown = clap_markdown::help_markdown::<odp_ingest::cli::Cli>();

    let content = format!(
        r#"---
title: CLI Reference
description: Complete command reference for the ODP ingest CLI
---

# ODP Ingest CLI Reference

This documentation is auto-generated from the CLI source code. Last updated: {}.

## Overview

`odp-ingest` ingests framework-agreement ("acuerdo marco") procurement
exports into the ODP store: it replaces the agreement's stored record set
and reconciles brand alerts.

## Installation

```bash
git clone https://github.com/odp-lab/odp.git
cd odp
cargo install --path crates/odp-ingest
```

## Quick Start

```bash
# Validate an export without writing anything
odp-ingest upload --file ordenes.xlsx \
  --agreement "EXT-CE-2024-11 Catálogo de Cómputo" --dry-run

# Ingest for real (requires DATABASE_URL)
odp-ingest upload --file ordenes.xlsx \
  --agreement "EXT-CE-2024-11 Catálogo de Cómputo"

# Clear an agreement's stored entries
odp-ingest reset --code EXT-CE-2024-11
```

## Commands

{}

## Environment Variables

- `DATABASE_URL` - Postgres connection string
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR` - logging configuration

---

*This documentation is automatically generated from the CLI source code. To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    // Create output directory if it doesn't exist
    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    // Write the markdown file
    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
