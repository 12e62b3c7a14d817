//! `load_config` module: builds the core `StorageConfig` from an optional YAML file,
//! the process environment and CLI overrides.
//!
//! # Sources
//! - YAML file (optional, `--config`): `url` and `backup_dir`. The credential is never
//!   accepted from the file; unknown keys are rejected.
//! - Environment: `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`, `BACKUP_DIR`. The binary
//!   loads a `.env` file into the environment before this runs.
//! - CLI: `--backup-dir` overrides every other source.
//!
//! # Errors
//! A missing URL or credential is an `anyhow::Error`; the CLI exits nonzero before
//! touching storage.
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use storage_backup_core::config::{StorageConfig, DEFAULT_BACKUP_DIR};
use tracing::{error, info};

pub const URL_ENV: &str = "SUPABASE_URL";
pub const KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const BACKUP_DIR_ENV: &str = "BACKUP_DIR";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

/// Parse the YAML config file at `path`.
pub fn read_config_file(path: &Path) -> Result<FileConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path, e)
    })?;

    let parsed: FileConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML {:?}: {e}", path)
    })?;
    info!(config_path = ?path, "Parsed config YAML successfully");
    Ok(parsed)
}

/// Non-empty value of an environment variable.
fn env_value(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn load_config(config_path: Option<&Path>, backup_dir: Option<PathBuf>) -> Result<StorageConfig> {
    let file = match config_path {
        Some(path) => read_config_file(path)?,
        None => FileConfig::default(),
    };

    let url = file
        .url
        .filter(|u| !u.trim().is_empty())
        .or_else(|| env_value(URL_ENV));
    let service_role_key = env_value(KEY_ENV);

    let (url, service_role_key) = match (url, service_role_key) {
        (Some(url), Some(key)) => (url, key),
        (url, key) => {
            let mut missing = Vec::new();
            if url.is_none() {
                missing.push(URL_ENV);
            }
            if key.is_none() {
                missing.push(KEY_ENV);
            }
            error!(?missing, "Required storage configuration missing");
            bail!("{} required", missing.join(" and "));
        }
    };

    let backup_dir = backup_dir
        .or(file.backup_dir)
        .or_else(|| env_value(BACKUP_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));

    let config = StorageConfig {
        url: url.trim_end_matches('/').to_string(),
        service_role_key,
        backup_dir,
    };
    reqwest::Url::parse(&config.url).with_context(|| format!("{URL_ENV} is not a valid URL: {:?}", config.url))?;
    config.trace_loaded();
    Ok(config)
}
