use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{postgres::PgListener, types::Json, PgPool};
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use crate::{
    entities::document::{Collection, ListOrder, StoredDocument},
    errors::AppError,
    repositories::document_store::{not_found, DocumentStore, CHANGE_CHANNEL_CAPACITY},
};

/// Postgres NOTIFY channel carrying the name of the collection that changed.
pub const CHANGE_CHANNEL: &str = "content_changes";

const RETURNING: &str = "RETURNING id, collection, data, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    collection: String,
    data: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(StoredDocument {
            id: row.id,
            collection: row.collection.parse()?,
            data: row.data.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Documents in one JSONB table. Every write also notifies
/// [`CHANGE_CHANNEL`] so other instances see it.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<Collection>,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        PgDocumentStore { pool, changes }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalError(format!("Migration failed: {}", e)))
    }

    /// Forwards NOTIFY payloads into the local broadcast channel,
    /// reconnecting with backoff whenever the listener connection drops.
    pub fn spawn_listener(&self) -> JoinHandle<()> {
        let pool = self.pool.clone();
        let changes = self.changes.clone();

        tokio::spawn(async move {
            let mut wait_seconds = 1;
            loop {
                if let Err(e) = forward_notifications(&pool, &changes).await {
                    tracing::error!(
                        "Change listener failed: {}. Reconnecting in {}s...",
                        e, wait_seconds
                    );
                }
                if pool.is_closed() {
                    tracing::info!("Database pool closed, change listener stopping");
                    return;
                }
                tokio::time::sleep(Duration::from_secs(wait_seconds)).await;
                wait_seconds = (wait_seconds * 2).min(60);
            }
        })
    }

    async fn write_and_notify(
        &self,
        collection: Collection,
        query: sqlx::query::QueryAs<'_, sqlx::Postgres, DocumentRow, sqlx::postgres::PgArguments>,
    ) -> Result<Option<StoredDocument>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = query.fetch_optional(&mut *tx).await?;
        if row.is_some() {
            // delivered on commit
            sqlx::query("SELECT pg_notify($1, $2)")
                .bind(CHANGE_CHANNEL)
                .bind(collection.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        row.map(StoredDocument::try_from).transpose()
    }
}

async fn forward_notifications(
    pool: &PgPool,
    changes: &broadcast::Sender<Collection>,
) -> Result<(), sqlx::Error> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(CHANGE_CHANNEL).await?;
    tracing::info!("Listening for document changes on '{}'", CHANGE_CHANNEL);

    loop {
        let notification = listener.recv().await?;
        match notification.payload().parse::<Collection>() {
            Ok(collection) => {
                let _ = changes.send(collection);
            }
            Err(_) => tracing::warn!(
                "Ignoring change notification for unknown collection '{}'",
                notification.payload()
            ),
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create(&self, collection: Collection, data: Map<String, Value>) -> Result<StoredDocument, AppError> {
        let sql = format!(
            "INSERT INTO documents (id, collection, data, created_at) VALUES ($1, $2, $3, NOW()) {}",
            RETURNING
        );
        let query = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(collection.as_str())
            .bind(Json(data));

        self.write_and_notify(collection, query)
            .await?
            .ok_or_else(|| AppError::InternalError("Insert returned no row".into()))
    }

    async fn get(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"SELECT id, collection, data, created_at, updated_at
               FROM documents WHERE collection = $1 AND id = $2"#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found(collection, id))?;

        row.try_into()
    }

    async fn list(&self, collection: Collection, order: ListOrder) -> Result<Vec<StoredDocument>, AppError> {
        let sql = match order {
            ListOrder::Natural => {
                r#"SELECT id, collection, data, created_at, updated_at
                   FROM documents WHERE collection = $1 ORDER BY created_at ASC, id ASC"#
            }
            ListOrder::CreatedDesc => {
                r#"SELECT id, collection, data, created_at, updated_at
                   FROM documents WHERE collection = $1 ORDER BY created_at DESC, id DESC"#
            }
        };

        sqlx::query_as::<_, DocumentRow>(sql)
            .bind(collection.as_str())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(StoredDocument::try_from)
            .collect()
    }

    async fn merge(&self, collection: Collection, id: &Uuid, data: Map<String, Value>) -> Result<StoredDocument, AppError> {
        let sql = format!(
            "UPDATE documents SET data = data || $3, updated_at = NOW() WHERE collection = $1 AND id = $2 {}",
            RETURNING
        );
        let query = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(data));

        self.write_and_notify(collection, query)
            .await?
            .ok_or_else(|| not_found(collection, id))
    }

    async fn delete(&self, collection: Collection, id: &Uuid) -> Result<StoredDocument, AppError> {
        let sql = format!(
            "DELETE FROM documents WHERE collection = $1 AND id = $2 {}",
            RETURNING
        );
        let query = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(collection.as_str())
            .bind(id);

        self.write_and_notify(collection, query)
            .await?
            .ok_or_else(|| not_found(collection, id))
    }

    async fn count(&self, collection: Collection) -> Result<usize, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as usize)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.changes.subscribe()
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn is_durable(&self) -> bool {
        true
    }
}
