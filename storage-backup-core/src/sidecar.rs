//! Reading and writing the `buckets.json` sidecar.
//!
//! The sidecar is a pretty-printed (2-space) JSON array of [`Bucket`] records and is
//! the only state carried from a backup run to a restore run.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::contract::Bucket;
use crate::error::SidecarError;

/// Write `buckets` to `path`, replacing any previous sidecar.
pub fn write_sidecar(path: &Path, buckets: &[Bucket]) -> Result<(), SidecarError> {
    let json = serde_json::to_string_pretty(buckets).map_err(|source| SidecarError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SidecarError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| SidecarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), buckets = buckets.len(), "Wrote bucket sidecar");
    Ok(())
}

/// Read the sidecar at `path`. A missing file yields an empty list.
pub fn read_sidecar(path: &Path) -> Result<Vec<Bucket>, SidecarError> {
    if !path.exists() {
        debug!(path = %path.display(), "No bucket sidecar present");
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|source| SidecarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let buckets: Vec<Bucket> =
        serde_json::from_str(&content).map_err(|source| SidecarError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), buckets = buckets.len(), "Read bucket sidecar");
    Ok(buckets)
}
