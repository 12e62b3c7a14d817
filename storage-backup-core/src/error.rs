//! Error types shared by the storage client seam and the backup/restore pipelines.
//!
//! Only two outcomes abort a run: a missing configuration (surfaced by the CLI crate)
//! and a failure to list buckets during backup ([`BackupError::ListBuckets`]).
//! Everything else is logged by the pipelines and skipped.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`StorageClient`](crate::contract::StorageClient) implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The request never produced a response (connection, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The storage API answered with a non-success status.
    #[error("storage API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reading or writing the `buckets.json` sidecar.
#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("sidecar IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sidecar JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal backup failures.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to list buckets: {0}")]
    ListBuckets(#[source] StorageError),
}

/// Fatal restore failures.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("failed to read backup directory {path}: {source}")]
    ReadBackupDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
