use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::entities::document::Collection;

/// A file received from an admin form, not yet stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUpload {
    pub path: String,
    pub url: String,
    pub content_type: String,
    pub size: usize,
}

/// `${collection}/${epochMillis}-${filename}`
pub fn blob_path(collection: Collection, at: DateTime<Utc>, file_name: &str) -> String {
    format!("{}/{}-{}", collection, at.timestamp_millis(), safe_file_name(file_name))
}

/// Keeps the original name recognisable while making it URL and path safe.
pub fn safe_file_name(file_name: &str) -> String {
    // Browsers on some platforms send the full client path
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let path = Path::new(base);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slug::slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Upload time encoded in a blob path, if it follows the naming convention.
pub fn uploaded_at_millis(path: &str) -> Option<i64> {
    let file = path.rsplit('/').next()?;
    let (millis, _) = file.split_once('-')?;
    millis.parse().ok()
}
