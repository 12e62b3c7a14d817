//! Restore pipeline: uploads every bucket directory under `<backup_dir>/storage`.
//!
//! The bucket directories on disk decide what is restored; the sidecar only
//! supplies configuration for buckets that have to be created. Existing remote
//! buckets are used as they are and never reconfigured.
//!
//! A failed bucket creation skips that bucket. Failed reads and uploads are
//! logged and left out of the uploaded count.

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

use crate::config::StorageConfig;
use crate::contract::{Bucket, StorageClient};
use crate::error::RestoreError;
use crate::local_tree::get_all_files;
use crate::sidecar::read_sidecar;
use crate::transfer::upload_file;

#[derive(Debug, Default)]
pub struct RestoreReport {
    pub buckets: Vec<BucketRestoreReport>,
    /// Bucket directories skipped because the bucket could not be created.
    pub skipped: Vec<String>,
}

#[derive(Debug)]
pub struct BucketRestoreReport {
    pub name: String,
    /// Whether this run created the remote bucket.
    pub created: bool,
    pub total: usize,
    pub uploaded: usize,
    pub failed: Vec<String>,
}

impl RestoreReport {
    pub fn total_files(&self) -> usize {
        self.buckets.iter().map(|b| b.total).sum()
    }

    pub fn uploaded_files(&self) -> usize {
        self.buckets.iter().map(|b| b.uploaded).sum()
    }
}

/// Names of the bucket directories directly under `storage_dir`, sorted.
fn bucket_dirs(storage_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(storage_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(dir = ?raw, "[RESTORE] Skipping bucket directory with a non UTF-8 name"),
        }
    }
    names.sort();
    Ok(names)
}

/// Make sure `bucket` exists remotely. Returns `Some(created)` when the bucket is
/// usable and `None` when it is absent and could not be created.
async fn ensure_bucket<C>(client: &C, bucket: &Bucket) -> Option<bool>
where
    C: StorageClient + ?Sized,
{
    let exists = match client.list_buckets().await {
        Ok(existing) => existing.iter().any(|b| b.name == bucket.name),
        Err(e) => {
            warn!(bucket = %bucket.name, error = %e, "[RESTORE] Could not list remote buckets, assuming bucket is absent");
            false
        }
    };
    if exists {
        info!(bucket = %bucket.name, "[RESTORE] Bucket already exists");
        return Some(false);
    }

    info!(
        bucket = %bucket.name,
        public = bucket.public,
        file_size_limit = ?bucket.file_size_limit,
        "[RESTORE] Creating bucket"
    );
    match client.create_bucket(bucket.clone()).await {
        Ok(()) => Some(true),
        Err(e) => {
            error!(bucket = %bucket.name, error = %e, "[RESTORE][ERROR] Error creating bucket, skipping it");
            None
        }
    }
}

pub async fn restore_storage<C>(client: &C, config: &StorageConfig) -> Result<RestoreReport, RestoreError>
where
    C: StorageClient + ?Sized,
{
    let storage_dir = config.storage_dir();
    if !storage_dir.is_dir() {
        info!(path = %storage_dir.display(), "[RESTORE] No storage backup found");
        return Ok(RestoreReport::default());
    }

    let sidecar = read_sidecar(&config.sidecar_path()).unwrap_or_else(|e| {
        warn!(error = %e, "[RESTORE] Ignoring unreadable bucket sidecar, buckets will be created private");
        Vec::new()
    });

    let names = bucket_dirs(&storage_dir).map_err(|source| RestoreError::ReadBackupDir {
        path: storage_dir.clone(),
        source,
    })?;
    info!(count = names.len(), buckets = ?names, "[RESTORE] Found buckets to restore");

    let mut report = RestoreReport::default();
    for name in names {
        info!(bucket = %name, "[RESTORE] Restoring bucket");
        let bucket = sidecar
            .iter()
            .find(|b| b.name == name)
            .cloned()
            .unwrap_or_else(|| Bucket::private(name.as_str()));

        let Some(created) = ensure_bucket(client, &bucket).await else {
            report.skipped.push(name);
            continue;
        };

        let bucket_dir = storage_dir.join(&name);
        let files = match get_all_files(&bucket_dir) {
            Ok(files) => files,
            Err(e) => {
                error!(bucket = %name, dir = %bucket_dir.display(), error = ?e, "[RESTORE][ERROR] Failed to walk bucket directory");
                Vec::new()
            }
        };
        info!(bucket = %name, files = files.len(), "[RESTORE] Found files to upload");

        let mut bucket_report = BucketRestoreReport {
            name: name.clone(),
            created,
            total: files.len(),
            uploaded: 0,
            failed: Vec::new(),
        };
        for file in files {
            if upload_file(client, &name, &file.relative_path, &file.full_path).await {
                bucket_report.uploaded += 1;
                info!(bucket = %name, path = %file.relative_path, "[RESTORE] Uploaded");
            } else {
                bucket_report.failed.push(file.relative_path);
            }
        }
        report.buckets.push(bucket_report);
    }

    info!(
        uploaded = report.uploaded_files(),
        total = report.total_files(),
        "[RESTORE] Storage restore complete"
    );
    Ok(report)
}
