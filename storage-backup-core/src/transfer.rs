//! Single-object transfers between the local filesystem and remote storage.
//!
//! Both directions report failure as `false` after logging it, so the calling
//! pipeline can count successes and move on to the next file.

use std::fs;
use std::path::Path;

use tracing::{debug, error};

use crate::content_type::content_type;
use crate::contract::{StorageClient, UploadOptions};

/// Download `remote_path` from `bucket` into `local_path`, creating parent
/// directories and overwriting an existing file.
pub async fn download_file<C>(client: &C, bucket: &str, remote_path: &str, local_path: &Path) -> bool
where
    C: StorageClient + ?Sized,
{
    let bytes = match client.download(bucket, remote_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(bucket, path = remote_path, error = %e, "Error downloading object");
            return false;
        }
    };

    if let Some(parent) = local_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            error!(bucket, path = remote_path, dir = %parent.display(), error = ?e, "Failed to create local directory");
            return false;
        }
    }

    match fs::write(local_path, &bytes) {
        Ok(()) => {
            debug!(bucket, path = remote_path, local = %local_path.display(), size = bytes.len(), "Wrote object to disk");
            true
        }
        Err(e) => {
            error!(bucket, path = remote_path, local = %local_path.display(), error = ?e, "Failed to write downloaded object");
            false
        }
    }
}

/// Upload the file at `local_path` to `remote_path` in `bucket`, overwriting any
/// existing object. The content type is inferred from the remote path.
pub async fn upload_file<C>(client: &C, bucket: &str, remote_path: &str, local_path: &Path) -> bool
where
    C: StorageClient + ?Sized,
{
    let content = match fs::read(local_path) {
        Ok(content) => content,
        Err(e) => {
            error!(bucket, path = remote_path, local = %local_path.display(), error = ?e, "Failed to read local file");
            return false;
        }
    };
    let size = content.len();
    let options = UploadOptions {
        content_type: content_type(remote_path).to_string(),
        upsert: true,
    };

    match client.upload(bucket, remote_path, content, options).await {
        Ok(()) => {
            debug!(bucket, path = remote_path, size, "Uploaded object");
            true
        }
        Err(e) => {
            error!(bucket, path = remote_path, error = %e, "Error uploading object");
            false
        }
    }
}
