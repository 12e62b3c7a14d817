//! # Supabase Storage client
//!
//! Production implementation of the core `StorageClient` trait.
//!
//! [`SupabaseStorageClient`] talks to `<url>/storage/v1/...` with the service role
//! key sent both as a bearer token and as the `apikey` header. Every transport,
//! status and decoding failure is mapped to a core [`StorageError`]; the pipelines
//! decide whether it is fatal.
//!
//! Listing items with a `null` id are folders. See [`ListItem`].

use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};

use storage_backup_core::config::StorageConfig;
use storage_backup_core::contract::{
    Bucket, ListOptions, ObjectMetadata, RemoteEntry, StorageClient, UploadOptions,
};
use storage_backup_core::error::StorageError;

pub struct SupabaseStorageClient {
    http: reqwest::Client,
    base: Url,
    key: String,
}

/// One item of an `object/list` response.
#[derive(Debug, Deserialize)]
pub struct ListItem {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: Option<ItemMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

impl From<ListItem> for RemoteEntry {
    fn from(item: ListItem) -> Self {
        match item.id {
            Some(id) => {
                let metadata = item.metadata.unwrap_or_default();
                RemoteEntry::File {
                    name: item.name,
                    metadata: ObjectMetadata {
                        id,
                        size: metadata.size,
                        mimetype: metadata.mimetype,
                    },
                }
            }
            None => RemoteEntry::Folder { name: item.name },
        }
    }
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
    #[serde(rename = "sortBy")]
    sort_by: SortBy,
}

#[derive(Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

#[derive(Serialize)]
struct CreateBucketRequest<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_size_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_mime_types: Option<&'a [String]>,
}

/// Extract the `message` field of a storage error body, falling back to the raw body.
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn request_error(e: reqwest::Error) -> StorageError {
    StorageError::Request(e.to_string())
}

/// Turn a non-success response into [`StorageError::Api`].
async fn check(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StorageError> {
    let bytes = response.bytes().await.map_err(request_error)?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::Decode(e.to_string()))
}

impl SupabaseStorageClient {
    pub fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        let base = Url::parse(&config.url)
            .with_context(|| format!("Invalid storage URL {:?}", config.url))?;
        if base.cannot_be_a_base() {
            bail!("Storage URL {:?} cannot be used as a base URL", config.url);
        }
        tracing::info!(
            url = %base,
            key_set = !config.service_role_key.is_empty(),
            "Initialized SupabaseStorageClient"
        );
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            key: config.service_role_key.clone(),
        })
    }

    /// `<base>/storage/v1/<segments...>`, each segment percent-encoded.
    pub fn endpoint<'a, I>(&self, segments: I) -> Result<Url, StorageError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::Request(format!("cannot build URL from {}", self.base)))?
            .pop_if_empty()
            .extend(["storage", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// URL of one object: `object/<bucket>/<path>` with `path` split on `/`.
    pub fn object_url(&self, bucket: &str, path: &str) -> Result<Url, StorageError> {
        self.endpoint(["object", bucket].into_iter().chain(path.split('/')))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
    }
}

#[async_trait]
impl StorageClient for SupabaseStorageClient {
    async fn list_buckets(&self) -> Result<Vec<Bucket>, StorageError> {
        let url = self.endpoint(["bucket"])?;
        tracing::debug!(url = %url, "Listing buckets");
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(request_error)?;
        let buckets: Vec<Bucket> = decode(check(response).await?).await?;
        tracing::info!(count = buckets.len(), "Fetched buckets");
        Ok(buckets)
    }

    async fn create_bucket(&self, bucket: Bucket) -> Result<(), StorageError> {
        let url = self.endpoint(["bucket"])?;
        let body = CreateBucketRequest {
            id: &bucket.name,
            name: &bucket.name,
            public: bucket.public,
            file_size_limit: bucket.file_size_limit,
            allowed_mime_types: bucket.allowed_mime_types.as_deref(),
        };
        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        check(response).await?;
        tracing::info!(bucket = %bucket.name, public = bucket.public, "Created bucket");
        Ok(())
    }

    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<RemoteEntry>, StorageError> {
        let url = self.endpoint(["object", "list", bucket])?;
        let body = ListRequest {
            prefix,
            limit: options.limit,
            offset: options.offset,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };
        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        let items: Vec<ListItem> = decode(check(response).await?).await?;
        Ok(items.into_iter().map(RemoteEntry::from).collect())
    }

    async fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, StorageError> {
        let url = self.object_url(bucket, path)?;
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(request_error)?;
        let bytes = check(response).await?.bytes().await.map_err(request_error)?;
        Ok(bytes.to_vec())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: Vec<u8>,
        options: UploadOptions,
    ) -> Result<(), StorageError> {
        let url = self.object_url(bucket, path)?;
        let response = self
            .request(Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, options.content_type)
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(content)
            .send()
            .await
            .map_err(request_error)?;
        check(response).await?;
        Ok(())
    }
}
