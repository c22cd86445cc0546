use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    entities::document::{Collection, ListOrder, StoredDocument},
    errors::AppError,
};

/// Capacity of the change notification channel. Slow subscribers that fall
/// further behind skip ahead to a fresh snapshot.
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Loosely typed document storage, one namespace per collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create(&self, collection: Collection, data: Map<String, Value>) -> Result<StoredDocument, AppError>;
    async fn get(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError>;
    async fn list(&self, collection: Collection, order: ListOrder) -> Result<Vec<StoredDocument>, AppError>;
    /// Shallow merge of `data` into the existing document. Last write wins.
    async fn merge(&self, collection: Collection, id: &Uuid, data: Map<String, Value>) -> Result<StoredDocument, AppError>;
    /// Removes the document and hands back what was removed.
    async fn delete(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError>;
    async fn count(&self, collection: Collection) -> Result<usize, AppError>;
    async fn ping(&self) -> Result<(), AppError>;

    /// One notification per write, naming the collection that changed.
    fn subscribe(&self) -> broadcast::Receiver<Collection>;

    fn backend_name(&self) -> &'static str;

    /// Whether written documents outlive the process.
    fn is_durable(&self) -> bool;
}

pub(crate) fn not_found(collection: Collection, id: &Uuid) -> AppError {
    AppError::NotFound(format!("Document {} not found in {}", id, collection))
}
