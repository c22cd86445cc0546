use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::{
    content_store::ContentStore,
    entities::{
        document::{Collection, ContentKind, ListOrder},
        photo::Photo,
        project::{GameProject, WebsiteProject},
        upload::uploaded_at_millis,
    },
    errors::AppError,
    limiter::rate_limiter::RateLimiterStore,
};

/// Collections whose documents point at uploaded blobs.
pub const UPLOAD_COLLECTIONS: [Collection; 3] = [
    WebsiteProject::COLLECTION,
    GameProject::COLLECTION,
    Photo::COLLECTION,
];

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
}

/// Deletes blobs that no document references and that are older than
/// `grace`. The grace period covers uploads whose document write is still
/// in flight.
pub async fn reconcile_orphans(content: &ContentStore, grace: Duration) -> Result<ReconcileReport, AppError> {
    let mut report = ReconcileReport::default();
    let cutoff = Utc::now().timestamp_millis() - grace.as_millis() as i64;

    for collection in UPLOAD_COLLECTIONS {
        let referenced: HashSet<String> = content.documents
            .list(collection, ListOrder::Natural)
            .await?
            .iter()
            .filter_map(|doc| doc.str_field("image"))
            .filter_map(|url| content.blobs.path_from_url(url))
            .collect();

        let blobs = content.blobs.list(&format!("{}/", collection)).await?;
        report.scanned += blobs.len();

        for path in blobs {
            if referenced.contains(&path) {
                continue;
            }
            // blobs not named by us are left alone
            let Some(uploaded_at) = uploaded_at_millis(&path) else { continue };
            if uploaded_at > cutoff {
                continue;
            }

            match content.blobs.delete(&path).await {
                Ok(()) => {
                    tracing::info!("Removed orphaned blob {}", path);
                    report.removed.push(path);
                }
                Err(e) => {
                    tracing::warn!("Could not remove orphaned blob {}: {}", path, e);
                    report.failed.push(path);
                }
            }
        }
    }

    Ok(report)
}

/// Periodic orphan sweep plus pruning of idle rate limit windows.
pub async fn start_maintenance_task(
    content: ContentStore,
    limiter: RateLimiterStore,
    every: Duration,
    grace: Duration,
) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match reconcile_orphans(&content, grace).await {
            Ok(report) if !report.removed.is_empty() || !report.failed.is_empty() => tracing::info!(
                "Orphan sweep scanned {} blobs, removed {}, failed {}",
                report.scanned, report.removed.len(), report.failed.len()
            ),
            Ok(report) => tracing::debug!("Orphan sweep scanned {} blobs, nothing to remove", report.scanned),
            Err(e) => tracing::error!("Orphan sweep failed: {}", e),
        }

        let pruned = limiter.prune();
        if pruned > 0 {
            tracing::debug!(
                "Pruned {} idle rate limit windows, {} still tracked",
                pruned, limiter.tracked_keys()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::upload::blob_path,
        repositories::{blob_store::BlobStore, document_store::DocumentStore, memory_store::MemoryDocumentStore},
        storage::memory::MemoryBlobStore,
    };
    use std::sync::Arc;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[tokio::test]
    async fn sweep_removes_only_old_unreferenced_blobs() {
        let documents = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new("http://media.test"));
        let content = ContentStore::new(documents.clone(), blobs.clone());
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);

        let referenced = blob_path(Collection::Photos, two_hours_ago, "kept.png");
        let young_orphan = blob_path(Collection::Photos, Utc::now(), "pending.png");
        let old_orphan = blob_path(Collection::Games, two_hours_ago, "abandoned.png");
        let foreign = "photos/legacy-cover.png".to_string();
        for path in [&referenced, &young_orphan, &old_orphan, &foreign] {
            blobs.upload(path, "image/png", PNG.to_vec()).await.unwrap();
        }

        let image = content.blobs.public_url(&referenced);
        let data = serde_json::json!({ "title": "Harbour", "image": image });
        documents.create(Collection::Photos, data.as_object().cloned().unwrap()).await.unwrap();

        let report = reconcile_orphans(&content, Duration::from_secs(60 * 60)).await.unwrap();

        assert_eq!(report.scanned, 4);
        assert_eq!(report.removed, vec![old_orphan.clone()]);
        assert!(report.failed.is_empty());
        assert!(blobs.contains(&referenced));
        assert!(blobs.contains(&young_orphan));
        assert!(blobs.contains(&foreign));
        assert!(!blobs.contains(&old_orphan));
    }
}
