use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;

use crate::{
    errors::BlobError,
    repositories::blob_store::{check_blob_path, strip_public_base, BlobStore},
};

/// Blobs as plain files under a root directory, served back by `/media`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        LocalBlobStore {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        check_blob_path(path)?;
        Ok(self.root.join(path))
    }
}

fn content_type_of(bytes: &[u8]) -> String {
    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

async fn collect_files(dir: &Path, relative: &str, out: &mut Vec<String>) -> Result<(), BlobError> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let child = if relative.is_empty() { name } else { format!("{}/{}", relative, name) };

        if entry.file_type().await?.is_dir() {
            Box::pin(collect_files(&entry.path(), &child, out)).await?;
        } else {
            out.push(child);
        }
    }
    Ok(())
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, _content_type: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;

        tracing::debug!("Stored blob {} under {}", path, self.root.display());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, path: &str) -> Result<(Vec<u8>, String), BlobError> {
        let target = self.resolve(path)?;
        let bytes = fs::read(&target).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobError::NotFound(path.to_string()),
            _ => e.into(),
        })?;
        let content_type = content_type_of(&bytes);
        Ok((bytes, content_type))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        let mut paths = Vec::new();
        collect_files(&self.root, "", &mut paths).await?;
        paths.retain(|p| p.starts_with(prefix));
        paths.sort();
        Ok(paths)
    }

    fn public_url(&self, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|part| urlencoding::encode(part).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.public_base_url, encoded)
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        strip_public_base(&self.public_base_url, url)
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn store(dir: &tempfile::TempDir) -> LocalBlobStore {
        LocalBlobStore::new(dir.path(), "http://localhost:8080/media/")
    }

    #[tokio::test]
    async fn upload_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir);

        blobs.upload("photos/1-a.png", "image/png", PNG.to_vec()).await.unwrap();
        let (bytes, mime) = blobs.read("photos/1-a.png").await.unwrap();
        assert_eq!(bytes, PNG);
        assert_eq!(mime, "image/png");

        assert_eq!(blobs.list("photos/").await.unwrap(), vec!["photos/1-a.png"]);

        blobs.delete("photos/1-a.png").await.unwrap();
        assert!(matches!(blobs.read("photos/1-a.png").await, Err(BlobError::NotFound(_))));
        // second delete is still fine
        blobs.delete("photos/1-a.png").await.unwrap();
    }

    #[tokio::test]
    async fn url_round_trips_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir);
        let url = blobs.public_url("games/1-my cover.png");
        assert_eq!(url, "http://localhost:8080/media/games/1-my%20cover.png");
        assert_eq!(blobs.path_from_url(&url).as_deref(), Some("games/1-my cover.png"));
    }

    #[tokio::test]
    async fn refuses_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = store(&dir);
        let result = blobs.upload("../outside.png", "image/png", PNG.to_vec()).await;
        assert!(matches!(result, Err(BlobError::InvalidPath(_))));
    }
}
