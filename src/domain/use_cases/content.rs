use std::{marker::PhantomData, sync::Arc};

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    content_store::ContentStore,
    entities::{
        document::{ContentKind, Document, ListOrder, StoredDocument},
        upload::{blob_path, StoredUpload, UploadedFile},
    },
    errors::AppError,
    gallery::{filter_by_category, CategoryFilter},
    repositories::blob_store::BlobStore,
};

/// Image types accepted for upload, checked against the file's magic bytes.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/avif",
];

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub id: Uuid,
    /// Blob behind the deleted document's image, if it was one of ours.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_path: Option<String>,
    pub blob_removed: bool,
}

/// Create-or-update, upload and delete for one kind of content.
pub struct ContentHandler<K: ContentKind> {
    store: ContentStore,
    max_upload_bytes: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ContentKind> Clone for ContentHandler<K> {
    fn clone(&self) -> Self {
        ContentHandler {
            store: self.store.clone(),
            max_upload_bytes: self.max_upload_bytes,
            _kind: PhantomData,
        }
    }
}

impl<K: ContentKind> ContentHandler<K> {
    pub fn new(store: ContentStore, max_upload_bytes: usize) -> Self {
        ContentHandler {
            store,
            max_upload_bytes,
            _kind: PhantomData,
        }
    }

    /// Creates a document when `editing_id` is `None`, otherwise merges the
    /// draft into the existing one.
    #[tracing::instrument(skip(self, draft), fields(collection = %K::COLLECTION))]
    pub async fn submit(&self, draft: K::Draft, editing_id: Option<Uuid>) -> Result<Document<K>, AppError> {
        draft.validate()?;

        let record = K::from_draft(draft);
        let fields = record.to_fields()?;

        let replaced_image = match editing_id {
            Some(id) if K::ACCEPTS_UPLOADS => self.current_image(&id).await,
            _ => None,
        };

        let written = match editing_id {
            Some(id) => self.store.documents.merge(K::COLLECTION, &id, fields).await,
            None => self.store.documents.create(K::COLLECTION, fields).await,
        };

        let stored = written.map_err(|e| {
            tracing::error!("Failed to write {} document: {}", K::COLLECTION, e);
            e
        })?;

        if let Some(previous) = replaced_image {
            if record.image_url() != Some(previous.as_str()) {
                self.remove_blob_for_url(&previous).await;
            }
        }

        let document = Document::try_from(stored)?;
        tracing::info!(id = %document.id, "{} {}", K::COLLECTION, if editing_id.is_some() { "updated" } else { "created" });
        Ok(document)
    }

    /// Uploads first, then writes the document pointing at the new URL. If
    /// the write fails the fresh blob is removed again.
    #[tracing::instrument(skip(self, draft, file), fields(collection = %K::COLLECTION, file = %file.file_name))]
    pub async fn submit_with_upload(
        &self,
        mut draft: K::Draft,
        editing_id: Option<Uuid>,
        file: UploadedFile,
    ) -> Result<Document<K>, AppError> {
        // fail before touching storage
        draft.validate()?;

        let upload = self.upload_image(file).await?;
        K::set_draft_image(&mut draft, upload.url.clone());

        match self.submit(draft, editing_id).await {
            Ok(document) => Ok(document),
            Err(e) => {
                if let Err(cleanup) = self.store.blobs.delete(&upload.path).await {
                    tracing::warn!(
                        "Could not remove blob {} after failed write, leaving it to reconciliation: {}",
                        upload.path, cleanup
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn upload_image(&self, file: UploadedFile) -> Result<StoredUpload, AppError> {
        if !K::ACCEPTS_UPLOADS {
            return Err(AppError::InvalidInput(format!("{} do not accept uploads", K::COLLECTION)));
        }
        if file.bytes.is_empty() {
            return Err(AppError::InvalidInput("Uploaded file is empty".into()));
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                self.max_upload_bytes
            )));
        }

        let content_type = infer::get(&file.bytes)
            .map(|kind| kind.mime_type())
            .filter(|mime| ALLOWED_IMAGE_TYPES.contains(mime))
            .ok_or_else(|| AppError::UnsupportedMedia("Only PNG, JPEG, GIF, WebP and AVIF images are accepted".into()))?;

        let path = blob_path(K::COLLECTION, Utc::now(), &file.file_name);
        let size = file.bytes.len();

        self.store.blobs.upload(&path, content_type, file.bytes).await.map_err(|e| {
            tracing::error!("Upload of {} failed: {}", path, e);
            AppError::from(e)
        })?;

        let url = self.store.blobs.public_url(&path);
        tracing::info!("Uploaded {} ({} bytes)", path, size);

        Ok(StoredUpload {
            path,
            url,
            content_type: content_type.to_string(),
            size,
        })
    }

    /// Deletes the document, then makes one attempt at the blob behind its
    /// image. A failed blob delete is logged and does not fail the call.
    #[tracing::instrument(skip(self), fields(collection = %K::COLLECTION))]
    pub async fn delete(&self, id: &Uuid) -> Result<DeleteOutcome, AppError> {
        let removed = self.store.documents.delete(K::COLLECTION, id).await.map_err(|e| {
            if !matches!(e, AppError::NotFound(_)) {
                tracing::error!("Failed to delete {} document {}: {}", K::COLLECTION, id, e);
            }
            e
        })?;

        let image = removed.str_field("image").filter(|url| !url.is_empty());
        let blob_path = image.and_then(|url| self.store.blobs.path_from_url(url));
        let blob_removed = match image {
            Some(url) => self.remove_blob_for_url(url).await,
            None => false,
        };

        Ok(DeleteOutcome { id: removed.id, blob_path, blob_removed })
    }

    pub async fn get(&self, id: &Uuid) -> Result<Document<K>, AppError> {
        let stored = self.store.documents.get(K::COLLECTION, id).await?;
        Ok(Document::try_from(stored)?)
    }

    pub async fn list(&self, order: ListOrder, filter: &CategoryFilter) -> Result<Vec<Document<K>>, AppError> {
        let stored = self.store.documents.list(K::COLLECTION, order).await?;
        Ok(filter_by_category(decode_documents(stored), filter))
    }

    pub async fn count(&self) -> Result<usize, AppError> {
        self.store.documents.count(K::COLLECTION).await
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.store.blobs
    }

    async fn current_image(&self, id: &Uuid) -> Option<String> {
        self.store.documents
            .get(K::COLLECTION, id)
            .await
            .ok()
            .and_then(|doc| doc.str_field("image").map(str::to_string))
            .filter(|url| !url.is_empty())
    }

    /// Returns whether a delete was attempted and succeeded.
    async fn remove_blob_for_url(&self, url: &str) -> bool {
        let Some(path) = self.store.blobs.path_from_url(url) else {
            tracing::debug!("Image {} is not managed by this store, leaving it", url);
            return false;
        };

        match self.store.blobs.delete(&path).await {
            Ok(()) => {
                tracing::info!("Removed blob {}", path);
                true
            }
            Err(e) => {
                tracing::warn!("Best-effort delete of blob {} failed: {}", path, e);
                false
            }
        }
    }
}

/// Decodes stored documents, skipping any that no longer match the schema.
pub fn decode_documents<K: ContentKind>(stored: Vec<StoredDocument>) -> Vec<Document<K>> {
    stored
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id;
            Document::try_from(doc)
                .map_err(|e| tracing::warn!("Skipping malformed {} document {}: {}", K::COLLECTION, id, e))
                .ok()
        })
        .collect()
}
