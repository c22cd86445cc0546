use actix_web::{http::header::{CACHE_CONTROL, CONTENT_TYPE}, web, HttpResponse};

use crate::{errors::AppError, AppState};

/// Serves uploaded blobs back under `/media/{path}`.
pub async fn get_media(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let (bytes, content_type) = state.content.blobs.read(&path).await?;

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, content_type))
        .insert_header((CACHE_CONTROL, "public, max-age=31536000, immutable"))
        .body(bytes))
}
