//! Recursive walk of a local bucket directory for restore.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::SIDECAR_FILE_NAME;

/// A file found under a bucket's backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub full_path: PathBuf,
    /// Path below the bucket directory, `/`-separated. Used as the remote key.
    pub relative_path: String,
}

/// Collect every file below `dir`, depth first, in file-name order.
///
/// Files named `buckets.json` are skipped at any depth, not only the sidecar
/// at the storage root. Entries whose names are not valid UTF-8 cannot be
/// remote keys and are skipped with a warning.
pub fn get_all_files(dir: &Path) -> std::io::Result<Vec<LocalFile>> {
    fn visit_dir(dir: &Path, segments: &mut Vec<String>, results: &mut Vec<LocalFile>) -> std::io::Result<()> {
        let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %path.display(), "Skipping entry with a non UTF-8 name");
                continue;
            };
            if entry.file_type()?.is_dir() {
                segments.push(name);
                visit_dir(&path, segments, results)?;
                segments.pop();
            } else if name == SIDECAR_FILE_NAME {
                debug!(path = %path.display(), "Skipping sidecar-named file");
            } else {
                let mut relative_path = segments.join("/");
                if !relative_path.is_empty() {
                    relative_path.push('/');
                }
                relative_path.push_str(&name);
                results.push(LocalFile {
                    full_path: path,
                    relative_path,
                });
            }
        }
        Ok(())
    }

    let mut results = Vec::new();
    visit_dir(dir, &mut Vec::new(), &mut results)?;
    Ok(results)
}
