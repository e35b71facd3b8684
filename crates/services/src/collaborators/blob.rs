//! Blob storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("No file provided")]
    Empty,

    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub url: String,
}

/// Opaque object storage returning a URL per upload.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<StoredBlob, BlobError>;
}

#[derive(Debug, Clone)]
struct Blob {
    content_type: String,
    bytes: Vec<u8>,
}

/// Keeps uploads in memory under `memory://{folder}/{id}` URLs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Blob>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type and bytes stored at `url`.
    pub async fn get(&self, url: &str) -> Option<(String, Vec<u8>)> {
        self.blobs
            .read()
            .await
            .get(url)
            .map(|b| (b.content_type.clone(), b.bytes.clone()))
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
    ) -> Result<StoredBlob, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Empty);
        }
        let url = format!(
            "memory://{}/{}",
            folder.trim_matches('/'),
            uuid::Uuid::new_v4().simple()
        );
        self.blobs.write().await.insert(
            url.clone(),
            Blob {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        tracing::debug!(%url, "blob stored");
        Ok(StoredBlob { url })
    }
}
