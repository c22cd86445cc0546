use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{
    errors::BlobError,
    repositories::blob_store::{check_blob_path, strip_public_base, BlobStore},
};

#[derive(Debug, Clone)]
struct StoredBlob {
    content_type: String,
    bytes: Vec<u8>,
}

/// Keeps blobs in memory. Used by tests and by `blob_backend = "memory"`.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, StoredBlob>>,
    public_base_url: String,
}

impl MemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        MemoryBlobStore {
            blobs: Arc::new(DashMap::new()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        check_blob_path(path)?;
        self.blobs.insert(
            path.to_string(),
            StoredBlob { content_type: content_type.to_string(), bytes },
        );
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        check_blob_path(path)?;
        self.blobs.remove(path);
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<(Vec<u8>, String), BlobError> {
        check_blob_path(path)?;
        self.blobs
            .get(path)
            .map(|blob| (blob.bytes.clone(), blob.content_type.clone()))
            .ok_or_else(|| BlobError::NotFound(path.to_string()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        let mut paths: Vec<String> = self.blobs
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.public_base_url, urlencoding::encode(path).replace("%2F", "/"))
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        strip_public_base(&self.public_base_url, url)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
