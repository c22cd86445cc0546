use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    entities::document::{Collection, ListOrder, StoredDocument},
    errors::AppError,
    repositories::document_store::{not_found, DocumentStore, CHANGE_CHANNEL_CAPACITY},
};

/// Process-local store. Natural order is insertion order.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<StoredDocument>>>>,
    changes: broadcast::Sender<Collection>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        MemoryDocumentStore {
            collections: Arc::new(RwLock::new(HashMap::new())),
            changes,
        }
    }

    fn notify(&self, collection: Collection) {
        // No receivers is fine; nobody is watching yet
        let _ = self.changes.send(collection);
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, collection: Collection, data: Map<String, Value>) -> Result<StoredDocument, AppError> {
        let doc = StoredDocument {
            id: Uuid::new_v4(),
            collection,
            data,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.collections
            .write()
            .entry(collection)
            .or_default()
            .push(doc.clone());

        self.notify(collection);
        Ok(doc)
    }

    async fn get(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError> {
        self.collections
            .read()
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == *id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    async fn list(&self, collection: Collection, order: ListOrder) -> Result<Vec<StoredDocument>, AppError> {
        let mut docs = self.collections
            .read()
            .get(&collection)
            .cloned()
            .unwrap_or_default();

        if order == ListOrder::CreatedDesc {
            // stable sort keeps insertion order for equal timestamps, so reverse first
            docs.reverse();
            docs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(docs)
    }

    async fn merge(&self, collection: Collection, id: &Uuid, data: Map<String, Value>) -> Result<StoredDocument, AppError> {
        let updated = {
            let mut collections = self.collections.write();
            let doc = collections
                .get_mut(&collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == *id))
                .ok_or_else(|| not_found(collection, id))?;

            doc.data.extend(data);
            doc.updated_at = Some(Utc::now());
            doc.clone()
        };

        self.notify(collection);
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError> {
        let removed = {
            let mut collections = self.collections.write();
            let docs = collections
                .get_mut(&collection)
                .ok_or_else(|| not_found(collection, id))?;
            let index = docs
                .iter()
                .position(|d| d.id == *id)
                .ok_or_else(|| not_found(collection, id))?;
            docs.remove(index)
        };

        self.notify(collection);
        Ok(removed)
    }

    async fn count(&self, collection: Collection) -> Result<usize, AppError> {
        Ok(self.collections.read().get(&collection).map_or(0, Vec::len))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn is_durable(&self) -> bool {
        false
    }
}
