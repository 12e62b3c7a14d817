use std::path::PathBuf;
use tracing::{debug, info};

/// Default backup root when neither the CLI nor the environment names one.
pub const DEFAULT_BACKUP_DIR: &str = "backups/storage";

/// Name of the bucket metadata document written next to the bucket directories.
pub const SIDECAR_FILE_NAME: &str = "buckets.json";

/// Connection and layout settings for one backup or restore run.
#[derive(Clone)]
pub struct StorageConfig {
    /// Project endpoint, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Privileged key sent with every storage request.
    pub service_role_key: String,
    /// Local backup root. Buckets live under `<backup_dir>/storage`.
    pub backup_dir: PathBuf,
}

impl StorageConfig {
    /// Directory holding `buckets.json` and one subdirectory per bucket.
    pub fn storage_dir(&self) -> PathBuf {
        self.backup_dir.join("storage")
    }

    pub fn sidecar_path(&self) -> PathBuf {
        self.storage_dir().join(SIDECAR_FILE_NAME)
    }

    pub fn trace_loaded(&self) {
        info!(
            url = %self.url,
            backup_dir = %self.backup_dir.display(),
            key_set = !self.service_role_key.is_empty(),
            "Loaded StorageConfig"
        );
        debug!(?self, "StorageConfig loaded (full debug)");
    }
}

// The credential never reaches the logs.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("service_role_key", &"<redacted>")
            .field("backup_dir", &self.backup_dir)
            .finish()
    }
}
