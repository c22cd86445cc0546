use std::sync::Arc;

use serde::Serialize;

use crate::{
    db::postgres::create_pool,
    errors::AppError,
    repositories::{
        blob_store::BlobStore,
        document_store::DocumentStore,
        memory_store::MemoryDocumentStore,
        pg_store::PgDocumentStore,
    },
    settings::{AppConfig, BlobBackend, StoreBackend},
    storage::{local::LocalBlobStore, memory::MemoryBlobStore},
};

/// The one handle to documents and blobs, built at startup and shared by
/// every consumer.
#[derive(Clone)]
pub struct ContentStore {
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    /// False when documents only live in process memory.
    pub configured: bool,
    pub reachable: bool,
    pub document_backend: &'static str,
    pub blob_backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContentStore {
    pub fn new(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        ContentStore { documents, blobs }
    }

    pub fn in_memory(public_media_url: &str) -> Self {
        ContentStore::new(
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(MemoryBlobStore::new(public_media_url)),
        )
    }

    /// Builds the backends named in the config. For Postgres this connects,
    /// runs migrations and starts the change listener.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let documents: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Memory => {
                if config.is_production() {
                    tracing::warn!("Using the in-memory document store in production; content will not survive a restart");
                }
                Arc::new(MemoryDocumentStore::new())
            }
            StoreBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::ServiceUnavailable("DATABASE_URL is not configured".into())
                })?;
                let pool = create_pool(url).await.map_err(|e| {
                    AppError::ServiceUnavailable(format!("Could not connect to database: {}", e))
                })?;

                let store = PgDocumentStore::new(pool);
                store.migrate().await?;
                store.spawn_listener();
                Arc::new(store)
            }
        };

        let blobs: Arc<dyn BlobStore> = match config.blob_backend {
            BlobBackend::Local => Arc::new(LocalBlobStore::new(&config.blob_dir, &config.public_media_url)),
            BlobBackend::Memory => Arc::new(MemoryBlobStore::new(&config.public_media_url)),
        };

        tracing::info!(
            "Content store ready (documents: {}, blobs: {})",
            documents.backend_name(),
            blobs.backend_name()
        );

        Ok(ContentStore { documents, blobs })
    }

    pub async fn status(&self) -> StoreStatus {
        let ping = self.documents.ping().await;
        if let Err(e) = &ping {
            tracing::warn!("Document store ping failed: {}", e);
        }

        StoreStatus {
            configured: self.documents.is_durable(),
            reachable: ping.is_ok(),
            document_backend: self.documents.backend_name(),
            blob_backend: self.blobs.backend_name(),
            error: ping.err().map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::document::{Collection, ListOrder, StoredDocument};
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::{Map, Value};
    use tokio::sync::broadcast;
    use uuid::Uuid;

    mock! {
        Documents {}

        #[async_trait]
        impl DocumentStore for Documents {
            async fn create(&self, collection: Collection, data: Map<String, Value>) -> Result<StoredDocument, AppError>;
            async fn get(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError>;
            async fn list(&self, collection: Collection, order: ListOrder) -> Result<Vec<StoredDocument>, AppError>;
            async fn merge(&self, collection: Collection, id: &Uuid, data: Map<String, Value>) -> Result<StoredDocument, AppError>;
            async fn delete(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError>;
            async fn count(&self, collection: Collection) -> Result<usize, AppError>;
            async fn ping(&self) -> Result<(), AppError>;
            fn subscribe(&self) -> broadcast::Receiver<Collection>;
            fn backend_name(&self) -> &'static str;
            fn is_durable(&self) -> bool;
        }
    }

    fn with_documents(documents: MockDocuments) -> ContentStore {
        ContentStore::new(Arc::new(documents), Arc::new(MemoryBlobStore::new("http://media.test")))
    }

    #[tokio::test]
    async fn memory_documents_are_not_configured() {
        let status = ContentStore::in_memory("http://media.test").status().await;
        assert!(!status.configured);
        assert!(status.reachable);
    }

    #[tokio::test]
    async fn durable_store_reports_configured_and_ping_failures() {
        let mut documents = MockDocuments::new();
        documents.expect_is_durable().return_const(true);
        documents.expect_backend_name().return_const("custom");
        documents
            .expect_ping()
            .returning(|| Err(AppError::ServiceUnavailable("connection refused".into())));

        let status = with_documents(documents).status().await;

        assert!(status.configured);
        assert!(!status.reachable);
        assert_eq!(status.document_backend, "custom");
        assert!(status.error.is_some_and(|e| e.contains("connection refused")));
    }
}
