//! # contract: the seam between the pipelines and a remote object store
//!
//! The backup and restore pipelines only ever talk to storage through the
//! [`StorageClient`] trait defined here. The CLI crate implements it over the
//! Supabase Storage REST API; tests use the `mockall`-generated
//! `MockStorageClient` (exported under the `test-export-mocks` feature).
//!
//! ## Types
//! - [`Bucket`]: bucket name plus the configuration captured in the sidecar.
//! - [`RemoteEntry`]: one item of a folder listing, either a folder or a file.
//! - [`ListOptions`] / [`UploadOptions`]: per-call request knobs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mockall::automock;

use crate::error::StorageError;

/// Entries requested per folder listing. Only the first page is ever fetched.
pub const LIST_PAGE_LIMIT: u32 = 1000;

/// A remote bucket and the configuration that a restore re-applies.
///
/// This is also the record format of the `buckets.json` sidecar, so every field
/// is always serialized (absent options as `null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub file_size_limit: Option<u64>,
    #[serde(default)]
    pub allowed_mime_types: Option<Vec<String>>,
}

impl Bucket {
    /// Configuration used for a bucket directory with no sidecar record.
    pub fn private(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: false,
            file_size_limit: None,
            allowed_mime_types: None,
        }
    }
}

/// Metadata carried by a file entry in a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectMetadata {
    /// Object identity assigned by the store.
    pub id: String,
    pub size: Option<u64>,
    pub mimetype: Option<String>,
}

/// One item of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEntry {
    /// A virtual directory; its contents need another listing call.
    Folder { name: String },
    /// A stored object.
    File { name: String, metadata: ObjectMetadata },
}

impl RemoteEntry {
    pub fn name(&self) -> &str {
        match self {
            RemoteEntry::Folder { name } | RemoteEntry::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: LIST_PAGE_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// Overwrite an existing object at the same key instead of failing.
    pub upsert: bool,
}

/// Remote object storage as seen by the backup and restore pipelines.
///
/// Implementors own transport, authentication and response decoding, and map
/// every failure to a [`StorageError`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// List every bucket in the project.
    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError>;

    /// Create a bucket with the given visibility, size limit and MIME allowlist.
    async fn create_bucket(&self, bucket: Bucket) -> Result<(), StorageError>;

    /// List the direct children of `prefix` inside `bucket` (`""` is the bucket root).
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<RemoteEntry>, StorageError>;

    /// Fetch the full contents of one object.
    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Store `content` at `path` inside `bucket`.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        options: UploadOptions,
    ) -> Result<(), StorageError>;
}
