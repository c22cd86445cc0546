use async_trait::async_trait;

use crate::errors::BlobError;

/// File storage for uploaded images. Paths are relative and `/` separated,
/// e.g. `games/1700000000123-cover.png`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), BlobError>;

    /// Deleting a blob that does not exist is not an error.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;

    async fn read(&self, path: &str) -> Result<(Vec<u8>, String), BlobError>;

    /// Every stored path starting with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError>;

    fn public_url(&self, path: &str) -> String;

    /// Inverse of [`BlobStore::public_url`]. `None` for URLs this store
    /// did not hand out.
    fn path_from_url(&self, url: &str) -> Option<String>;

    fn backend_name(&self) -> &'static str;
}

/// Rejects anything that could escape the storage root.
pub fn check_blob_path(path: &str) -> Result<(), BlobError> {
    let invalid = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|part| part.is_empty() || part == "." || part == "..");

    if invalid {
        return Err(BlobError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Shared by the adapters: strips the public base URL and percent-decodes.
pub(crate) fn strip_public_base(base_url: &str, url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let rest = url.strip_prefix(base)?.strip_prefix('/')?;
    let rest = rest.split(['?', '#']).next().unwrap_or(rest);
    let path = urlencoding::decode(rest).ok()?.into_owned();

    check_blob_path(&path).ok().map(|_| path)
}
