use std::convert::Infallible;

use actix_web::{
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    web::Bytes,
    HttpResponse,
};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;

use crate::errors::AppError;

pub const SNAPSHOT_EVENT: &str = "snapshot";
pub const ERROR_EVENT: &str = "error";

/// One Server-Sent Events frame. `data` must not contain newlines, which
/// compact JSON never does.
pub fn sse_frame(event: &str, data: &str) -> Bytes {
    Bytes::from(format!("event: {}\ndata: {}\n\n", event, data))
}

fn to_frame<T: Serialize>(item: Result<T, AppError>) -> Bytes {
    let encoded = item.and_then(|value| serde_json::to_string(&value).map_err(AppError::from));
    match encoded {
        Ok(json) => sse_frame(SNAPSHOT_EVENT, &json),
        Err(e) => {
            tracing::warn!("Live snapshot failed: {}", e);
            let body = serde_json::json!({ "error": "Snapshot unavailable" });
            sse_frame(ERROR_EVENT, &body.to_string())
        }
    }
}

/// Streams every item as an `event: snapshot` frame, or an `event: error`
/// frame when reading it failed.
pub fn sse_response<S, T>(snapshots: S) -> HttpResponse
where
    S: Stream<Item = Result<T, AppError>> + 'static,
    T: Serialize + 'static,
{
    let body = snapshots.map(|item| Ok::<_, Infallible>(to_frame(item)));

    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(body)
}
