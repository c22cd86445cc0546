mod test_utils;

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use futures::StreamExt;
use portfolio_content::{
    content_store::ContentStore,
    entities::{
        document::{Collection, Document, ListOrder},
        project::{GameProject, ProjectDraft, WebsiteProject},
        tool::{Tool, ToolCategory, ToolDraft, ToolFields},
    },
    repositories::{
        document_store::{DocumentStore, CHANGE_CHANNEL_CAPACITY},
        memory_store::MemoryDocumentStore,
    },
    storage::memory::MemoryBlobStore,
    use_cases::{
        content::ContentHandler,
        live::{diff_snapshots, DashboardCounts, DashboardQuery, LiveQuery},
    },
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;
use tokio::time::timeout;
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(5);

fn memory_store() -> (Arc<MemoryDocumentStore>, ContentStore) {
    let documents = Arc::new(MemoryDocumentStore::new());
    let store = ContentStore::new(documents.clone(), Arc::new(MemoryBlobStore::new("http://media.test")));
    (documents, store)
}

fn game(title: &str) -> ProjectDraft {
    ProjectDraft {
        title: title.into(),
        description: "d".into(),
        ..Default::default()
    }
}

#[actix_rt::test]
async fn live_query_emits_initial_snapshot_then_each_change() {
    let (documents, store) = memory_store();
    let handler = ContentHandler::<GameProject>::new(store, 1024);
    let mut snapshots = LiveQuery::<GameProject>::new(documents).stream(ListOrder::Natural);

    let first = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert!(first.is_empty());

    let created = handler.submit(game("Test Game"), None).await.unwrap();
    let second = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, created.id);

    handler.delete(&created.id).await.unwrap();
    let third = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert!(third.is_empty());
}

#[actix_rt::test]
async fn live_query_ignores_other_collections() {
    let (documents, store) = memory_store();
    let websites = ContentHandler::<WebsiteProject>::new(store.clone(), 1024);
    let games = ContentHandler::<GameProject>::new(store, 1024);
    let mut snapshots = LiveQuery::<GameProject>::new(documents).stream(ListOrder::Natural);

    timeout(WAIT, snapshots.next()).await.unwrap();

    websites.submit(game("Landing Page"), None).await.unwrap();
    let pending = timeout(Duration::from_millis(100), snapshots.next()).await;
    assert!(pending.is_err());

    games.submit(game("Lantern Run"), None).await.unwrap();
    let next = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(next.len(), 1);
}

#[actix_rt::test]
async fn burst_of_writes_reflected_in_latest_snapshot() {
    let (documents, store) = memory_store();
    let handler = ContentHandler::<GameProject>::new(store, 1024);
    let mut snapshots = LiveQuery::<GameProject>::new(documents).stream(ListOrder::Natural);

    timeout(WAIT, snapshots.next()).await.unwrap();

    for i in 0..5 {
        handler.submit(game(&format!("Game {}", i)), None).await.unwrap();
    }

    let latest = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(latest.len(), 5);
}

#[actix_rt::test]
async fn lagging_subscriber_still_gets_one_fresh_snapshot() {
    let (documents, store) = memory_store();
    let handler = ContentHandler::<GameProject>::new(store, 1024);
    let mut snapshots = LiveQuery::<GameProject>::new(documents).stream(ListOrder::Natural);

    timeout(WAIT, snapshots.next()).await.unwrap();

    let writes = CHANGE_CHANNEL_CAPACITY + 10;
    for i in 0..writes {
        handler.submit(game(&format!("Game {}", i)), None).await.unwrap();
    }

    let latest = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(latest.len(), writes);

    let pending = timeout(Duration::from_millis(100), snapshots.next()).await;
    assert!(pending.is_err());
}

#[actix_rt::test]
async fn unchanged_snapshot_is_not_sent_twice() {
    let (documents, store) = memory_store();
    let handler = ContentHandler::<GameProject>::new(store, 1024);
    handler.submit(game("Lantern Run"), None).await.unwrap();
    let mut snapshots = LiveQuery::<GameProject>::new(documents.clone()).stream(ListOrder::Natural);

    let first = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(first.len(), 1);

    // a document that does not decode is skipped, leaving the snapshot as it was
    documents.create(Collection::Games, serde_json::Map::new()).await.unwrap();
    let pending = timeout(Duration::from_millis(100), snapshots.next()).await;
    assert!(pending.is_err());

    handler.submit(game("Tide Pool"), None).await.unwrap();
    let next = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(next.len(), 2);
}

#[actix_rt::test]
async fn newest_first_order() {
    let (documents, store) = memory_store();
    let handler = ContentHandler::<GameProject>::new(store, 1024);
    handler.submit(game("Old"), None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    handler.submit(game("New"), None).await.unwrap();

    let mut snapshots = LiveQuery::<GameProject>::new(documents).stream(ListOrder::CreatedDesc);
    let first = timeout(WAIT, snapshots.next()).await.unwrap().unwrap().unwrap();

    let titles: Vec<&str> = first.iter().map(|doc| doc.data.0.title.as_str()).collect();
    assert_eq!(titles, vec!["New", "Old"]);
}

#[actix_rt::test]
async fn dashboard_counts_follow_writes() {
    let (documents, store) = memory_store();
    let tools = ContentHandler::<Tool>::new(store, 1024);
    let mut counts = DashboardQuery::new(documents.clone()).stream();

    let first = timeout(WAIT, counts.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(first, DashboardCounts::default());

    tools
        .submit(ToolDraft { name: "Figma".into(), level: 80, category: ToolCategory::Design }, None)
        .await
        .unwrap();

    let second = timeout(WAIT, counts.next()).await.unwrap().unwrap().unwrap();
    assert_eq!(second.tools, 1);
    assert_eq!(second, DashboardCounts { tools: 1, ..Default::default() });

    // skills are not on the dashboard
    documents.create(Collection::Skills, serde_json::Map::new()).await.unwrap();
    let pending = timeout(Duration::from_millis(100), counts.next()).await;
    assert!(pending.is_err());
}

#[actix_rt::test]
async fn live_endpoint_streams_snapshots() {
    let app = TestApp::spawn().await;

    let mut response = app
        .client
        .get(app.url("/api/v1/content/games/live"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let mut buffer = String::new();
    let first = next_frame(&mut response, &mut buffer).await;
    assert_eq!(first, ("snapshot".to_string(), json!([])));

    app.admin_post("/api/v1/admin/games", &json!({ "title": "Test Game", "description": "d" }))
        .await;

    let (event, data) = next_frame(&mut response, &mut buffer).await;
    assert_eq!(event, "snapshot");
    assert_eq!(data[0]["title"], "Test Game");
}

#[actix_rt::test]
async fn dashboard_endpoint_requires_admin() {
    let app = TestApp::spawn().await;

    let anonymous = app.client.get(app.url("/api/v1/admin/dashboard/live")).send().await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let mut response = app
        .client
        .get(app.url("/api/v1/admin/dashboard/live"))
        .bearer_auth(app.admin_token())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut buffer = String::new();
    let (_, counts) = next_frame(&mut response, &mut buffer).await;
    assert_eq!(counts["websites"], 0);
    assert_eq!(counts["photos"], 0);
}

/// Reads until one complete `event:`/`data:` frame is buffered.
async fn next_frame(response: &mut reqwest::Response, buffer: &mut String) -> (String, Value) {
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            let mut event = String::new();
            let mut data = Value::Null;
            for line in frame.lines() {
                if let Some(name) = line.strip_prefix("event: ") {
                    event = name.to_string();
                } else if let Some(json) = line.strip_prefix("data: ") {
                    data = serde_json::from_str(json).unwrap();
                }
            }
            return (event, data);
        }

        let chunk = timeout(WAIT, response.chunk())
            .await
            .expect("Timed out waiting for an event")
            .unwrap()
            .expect("Stream ended");
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

fn tool(id: Uuid, name: &str, level: u8) -> Document<Tool> {
    Document {
        id,
        data: Tool(ToolFields { name: name.into(), level, category: ToolCategory::Web }),
        created_at: Utc::now(),
        updated_at: None,
    }
}

#[test]
fn diff_reports_added_updated_and_removed() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let prev = vec![tool(a, "React", 50), tool(b, "Vue", 40)];
    let next = vec![prev[0].clone(), tool(b, "Vue", 60), tool(c, "Svelte", 30)];

    let diff = diff_snapshots(&prev, &next);

    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.added[0].id, c);
    assert_eq!(diff.updated.len(), 1);
    assert_eq!(diff.updated[0].data.0.level, 60);
    assert!(diff.removed.is_empty());

    let gone = diff_snapshots(&next, &next[..1]);
    assert_eq!(gone.removed, vec![b, c]);
    assert!(diff_snapshots(&next, &next).is_empty());
}
