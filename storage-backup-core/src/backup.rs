//! Backup pipeline: mirrors every remote bucket into `<backup_dir>/storage`.
//!
//! Steps, all strictly sequential:
//!   - list buckets (the only fatal failure)
//!   - write the `buckets.json` sidecar with each bucket's configuration
//!   - for each bucket, enumerate its files and download them to
//!     `<backup_dir>/storage/<bucket>/<path>`
//!
//! Individual listing, download and write failures are logged and leave the
//! affected files out of the downloaded count.

use std::fs;

use tracing::{error, info, warn};

use crate::config::StorageConfig;
use crate::contract::StorageClient;
use crate::enumerate::list_all_files;
use crate::error::BackupError;
use crate::sidecar::write_sidecar;
use crate::transfer::download_file;

#[derive(Debug, Default)]
pub struct BackupReport {
    pub buckets: Vec<BucketBackupReport>,
}

#[derive(Debug)]
pub struct BucketBackupReport {
    pub name: String,
    /// Files found by the enumerator.
    pub total: usize,
    pub downloaded: usize,
    /// Paths that were found but not saved locally.
    pub failed: Vec<String>,
}

impl BackupReport {
    pub fn total_files(&self) -> usize {
        self.buckets.iter().map(|b| b.total).sum()
    }

    pub fn downloaded_files(&self) -> usize {
        self.buckets.iter().map(|b| b.downloaded).sum()
    }
}

pub async fn backup_storage<C>(client: &C, config: &StorageConfig) -> Result<BackupReport, BackupError>
where
    C: StorageClient + ?Sized,
{
    info!("[BACKUP] Fetching storage buckets");
    let buckets = client.list_buckets().await.map_err(|e| {
        error!(error = %e, "[BACKUP][ERROR] Failed to list buckets");
        BackupError::ListBuckets(e)
    })?;

    if buckets.is_empty() {
        info!("[BACKUP] No storage buckets found");
        return Ok(BackupReport::default());
    }

    let storage_dir = config.storage_dir();
    if let Err(e) = write_sidecar(&config.sidecar_path(), &buckets) {
        error!(error = %e, "[BACKUP][ERROR] Failed to write bucket sidecar, continuing without it");
    }
    let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
    info!(count = buckets.len(), buckets = ?names, "[BACKUP] Found buckets");

    let mut report = BackupReport::default();
    for bucket in &buckets {
        info!(bucket = %bucket.name, "[BACKUP] Processing bucket");
        let bucket_dir = storage_dir.join(&bucket.name);
        if let Err(e) = fs::create_dir_all(&bucket_dir) {
            warn!(bucket = %bucket.name, dir = %bucket_dir.display(), error = ?e, "[BACKUP] Failed to create bucket directory");
        }

        let files = list_all_files(client, &bucket.name, "").await;
        info!(bucket = %bucket.name, files = files.len(), "[BACKUP] Enumerated bucket");

        let mut bucket_report = BucketBackupReport {
            name: bucket.name.clone(),
            total: files.len(),
            downloaded: 0,
            failed: Vec::new(),
        };
        for path in files {
            let local_path = bucket_dir.join(&path);
            if download_file(client, &bucket.name, &path, &local_path).await {
                bucket_report.downloaded += 1;
                info!(bucket = %bucket.name, path = %path, "[BACKUP] Downloaded");
            } else {
                bucket_report.failed.push(path);
            }
        }
        report.buckets.push(bucket_report);
    }

    info!(
        downloaded = report.downloaded_files(),
        total = report.total_files(),
        "[BACKUP] Storage backup complete"
    );
    Ok(report)
}
