use std::{
    collections::{HashMap, HashSet},
    marker::PhantomData,
    sync::Arc,
};

use futures::{
    future,
    stream::{self, BoxStream, StreamExt},
};
use serde::Serialize;
use tokio::sync::broadcast::{
    error::{RecvError, TryRecvError},
    Receiver,
};
use uuid::Uuid;

use crate::{
    entities::document::{Collection, ContentKind, Document, ListOrder},
    errors::AppError,
    repositories::document_store::DocumentStore,
    use_cases::content::decode_documents,
};

/// Yields once straight away, then once per batch of changes to
/// `collection`. Ends when the store's change channel closes.
fn changes_of(documents: &Arc<dyn DocumentStore>, collection: Collection) -> BoxStream<'static, ()> {
    // subscribe before the first read so no write can slip between the two
    let receiver = documents.subscribe();

    stream::unfold((receiver, true), move |(mut receiver, first)| async move {
        if !first {
            wait_for_change(&mut receiver, collection).await?;
        }
        Some(((), (receiver, false)))
    })
    .boxed()
}

async fn wait_for_change(receiver: &mut Receiver<Collection>, collection: Collection) -> Option<()> {
    loop {
        match receiver.recv().await {
            Ok(changed) if changed == collection => break,
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                // a fresh snapshot covers whatever we missed
                tracing::debug!("Live query for {} lagged by {} notifications", collection, skipped);
                break;
            }
            Err(RecvError::Closed) => return None,
        }
    }

    // one read covers every notification already queued
    loop {
        match receiver.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) => return Some(()),
            Err(TryRecvError::Closed) => return Some(()),
        }
    }
}

/// Full snapshots of one collection, re-read on every change.
pub struct LiveQuery<K: ContentKind> {
    documents: Arc<dyn DocumentStore>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ContentKind> LiveQuery<K> {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        LiveQuery { documents, _kind: PhantomData }
    }

    /// Lazy and restartable: every call subscribes anew, and dropping the
    /// stream drops the subscription. A re-read identical to the last
    /// emitted snapshot is not emitted again.
    pub fn stream(&self, order: ListOrder) -> BoxStream<'static, Result<Vec<Document<K>>, AppError>> {
        let documents = self.documents.clone();

        changes_of(&documents, K::COLLECTION)
            .then(move |_| {
                let documents = documents.clone();
                async move {
                    let stored = documents.list(K::COLLECTION, order).await?;
                    Ok::<_, AppError>(decode_documents::<K>(stored))
                }
            })
            .scan(None::<Vec<Document<K>>>, |last, snapshot| {
                let item = match snapshot {
                    Ok(next) => {
                        let unchanged = last
                            .as_deref()
                            .is_some_and(|prev| diff_snapshots(prev, &next).is_empty());
                        if unchanged {
                            None
                        } else {
                            *last = Some(next.clone());
                            Some(Ok(next))
                        }
                    }
                    Err(e) => Some(Err(e)),
                };
                future::ready(Some(item))
            })
            .filter_map(future::ready)
            .boxed()
    }
}

/// What changed between two consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDiff<K> {
    pub added: Vec<Document<K>>,
    pub updated: Vec<Document<K>>,
    pub removed: Vec<Uuid>,
}

impl<K> SnapshotDiff<K> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Order of `added` and `updated` follows `next`; `removed` follows `prev`.
pub fn diff_snapshots<K: Clone + PartialEq>(prev: &[Document<K>], next: &[Document<K>]) -> SnapshotDiff<K> {
    let before: HashMap<Uuid, &Document<K>> = prev.iter().map(|doc| (doc.id, doc)).collect();
    let after: HashSet<Uuid> = next.iter().map(|doc| doc.id).collect();

    let mut added = Vec::new();
    let mut updated = Vec::new();
    for doc in next {
        match before.get(&doc.id) {
            None => added.push(doc.clone()),
            Some(old) if *old != doc => updated.push(doc.clone()),
            Some(_) => {}
        }
    }

    let removed = prev
        .iter()
        .filter(|doc| !after.contains(&doc.id))
        .map(|doc| doc.id)
        .collect();

    SnapshotDiff { added, updated, removed }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub websites: usize,
    pub games: usize,
    pub experiences: usize,
    pub tools: usize,
    pub photos: usize,
}

impl DashboardCounts {
    fn from_map(counts: &HashMap<Collection, usize>) -> Self {
        let get = |collection| counts.get(&collection).copied().unwrap_or(0);
        DashboardCounts {
            websites: get(Collection::Websites),
            games: get(Collection::Games),
            experiences: get(Collection::Experiences),
            tools: get(Collection::Tools),
            photos: get(Collection::Photos),
        }
    }
}

/// Document counts for the dashboard collections in one stream. Dropping it
/// drops every underlying subscription.
pub struct DashboardQuery {
    documents: Arc<dyn DocumentStore>,
}

impl DashboardQuery {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        DashboardQuery { documents }
    }

    pub fn stream(&self) -> BoxStream<'static, Result<DashboardCounts, AppError>> {
        let per_collection = Collection::DASHBOARD.into_iter().map(|collection| {
            let documents = self.documents.clone();
            changes_of(&self.documents, collection)
                .then(move |_| {
                    let documents = documents.clone();
                    async move { (collection, documents.count(collection).await) }
                })
                .boxed()
        });

        stream::select_all(per_collection)
            .scan(HashMap::new(), |counts, (collection, result)| {
                let item = match result {
                    Ok(count) => {
                        counts.insert(collection, count);
                        // hold back until every collection reported once
                        (counts.len() == Collection::DASHBOARD.len())
                            .then(|| Ok(DashboardCounts::from_map(counts)))
                    }
                    Err(e) => Some(Err(e)),
                };
                future::ready(Some(item))
            })
            .filter_map(future::ready)
            .boxed()
    }
}
