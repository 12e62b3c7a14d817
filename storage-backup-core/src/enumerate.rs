//! Recursive listing of every object in a remote bucket.

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, error};

use crate::contract::{ListOptions, RemoteEntry, StorageClient};

/// Join a folder path and an entry name with `/`; the bucket root has no prefix.
pub fn join_remote_path(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

/// List the paths of all files below `folder` in `bucket`, depth first.
///
/// Only the first page ([`ListOptions::default`]) of each folder is requested.
/// A folder whose listing fails is logged and contributes no files.
pub fn list_all_files<'a, C>(
    client: &'a C,
    bucket: &'a str,
    folder: &'a str,
) -> BoxFuture<'a, Vec<String>>
where
    C: StorageClient + ?Sized,
{
    async move {
        let mut files = Vec::new();
        let entries = match client.list(bucket, folder, ListOptions::default()).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(bucket, folder, error = %e, "Failed to list folder, skipping it");
                return files;
            }
        };
        debug!(bucket, folder, entries = entries.len(), "Listed folder");

        for entry in entries {
            let path = join_remote_path(folder, entry.name());
            match entry {
                RemoteEntry::Folder { .. } => {
                    files.extend(list_all_files(client, bucket, &path).await);
                }
                RemoteEntry::File { .. } => files.push(path),
            }
        }
        files
    }
    .boxed()
}
