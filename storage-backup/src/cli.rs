//! This module implements the CLI interface for storage-backup: command parsing,
//! configuration loading and wiring of the Supabase client into the core pipelines.
//!
//! All backup/restore logic lives in the [`storage-backup-core`] crate. This module is
//! glue only.
//!
//! ## How To Use
//! - From the shell: `storage-backup backup` or `storage-backup restore`, see `--help`.
//! - Programmatically or from integration tests: call [`run`] with a constructed [`Cli`].
//!
//! ## Exit status
//! [`run`] returns an error, and the binary exits nonzero, only when configuration is
//! missing or invalid, when backup cannot list buckets, or when restore cannot read
//! an existing backup directory. Per-file failures are
//! logged and reflected in the printed counts.
//!
//! [`storage-backup-core`]: ../../storage_backup_core/
use crate::client::SupabaseStorageClient;
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storage_backup_core::backup::backup_storage;
use storage_backup_core::restore::restore_storage;

/// CLI for storage-backup: mirror storage buckets to disk and back.
#[derive(Parser)]
#[clap(
    name = "storage-backup",
    version,
    about = "Back up and restore Supabase Storage buckets to and from a local directory"
)]
pub struct Cli {
    /// Optional YAML config file with `url` and `backup_dir`
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backup root directory; overrides the config file and BACKUP_DIR
    #[clap(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download every bucket and its metadata into the backup directory
    Backup,
    /// Upload every bucket directory from the backup directory, creating missing buckets
    Restore,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_deref(), cli.backup_dir)?;
    let client = SupabaseStorageClient::new(&config)?;

    match cli.command {
        Commands::Backup => {
            tracing::info!(command = "backup", "Starting storage backup");
            let report = backup_storage(&client, &config)
                .await
                .context("Storage backup failed")?;
            tracing::info!(command = "backup", ?report, "Storage backup finished");
            println!(
                "Storage backup complete: {}/{} files downloaded",
                report.downloaded_files(),
                report.total_files()
            );
        }
        Commands::Restore => {
            tracing::info!(command = "restore", "Starting storage restore");
            let report = restore_storage(&client, &config)
                .await
                .context("Storage restore failed")?;
            tracing::info!(command = "restore", ?report, "Storage restore finished");
            println!(
                "Storage restore complete: {}/{} files uploaded",
                report.uploaded_files(),
                report.total_files()
            );
        }
    }

    Ok(())
}
