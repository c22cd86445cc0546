use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::document::{ContentKind, ListOrder},
    errors::AppError,
    gallery::{with_tiles, CategoryFilter},
    use_cases::{extractors::AdminClaims, live::LiveQuery},
    utils::{
        multipart::read_upload_form,
        sse::sse_response,
        valid_uuid::{optional_uuid, valid_uuid},
    },
    AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Bento,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub order: ListOrder,
    pub category: Option<String>,
    pub layout: Option<Layout>,
}

#[derive(Debug, Deserialize)]
pub struct LiveParams {
    #[serde(default)]
    pub order: ListOrder,
}

/// The admin form contract: a draft plus the id being edited, if any.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest<D> {
    #[serde(default)]
    pub editing_id: Option<String>,
    pub draft: D,
}

#[instrument(skip(state, query), fields(collection = %K::COLLECTION))]
pub async fn list_documents<K: ContentKind>(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner();
    let filter = query.category
        .as_deref()
        .map(CategoryFilter::from_label)
        .unwrap_or(CategoryFilter::All);

    let documents = state.content_handler::<K>().list(query.order, &filter).await?;

    let response = match query.layout {
        Some(Layout::Bento) => HttpResponse::Ok().json(with_tiles(documents)),
        None => HttpResponse::Ok().json(documents),
    };
    Ok(response)
}

#[instrument(skip(state, id), fields(collection = %K::COLLECTION))]
pub async fn get_document<K: ContentKind>(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&id)?;
    let document = state.content_handler::<K>().get(&id).await?;
    Ok(HttpResponse::Ok().json(document))
}

pub async fn live_documents<K: ContentKind>(
    state: web::Data<AppState>,
    params: web::Query<LiveParams>,
) -> impl Responder {
    tracing::debug!("Opening live feed for {}", K::COLLECTION);
    let snapshots = LiveQuery::<K>::new(state.content.documents.clone()).stream(params.order);
    sse_response(snapshots)
}

#[instrument(skip(_claims, state, draft), fields(collection = %K::COLLECTION))]
pub async fn create_document<K: ContentKind>(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    draft: web::Json<K::Draft>,
) -> Result<impl Responder, AppError> {
    let document = state.content_handler::<K>()
        .submit(draft.into_inner(), None)
        .await?;
    Ok(HttpResponse::Created().json(document))
}

#[instrument(skip(_claims, state, id, draft), fields(collection = %K::COLLECTION))]
pub async fn update_document<K: ContentKind>(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    id: web::Path<String>,
    draft: web::Json<K::Draft>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&id)?;
    let document = state.content_handler::<K>()
        .submit(draft.into_inner(), Some(id))
        .await?;
    Ok(HttpResponse::Ok().json(document))
}

#[instrument(skip(_claims, state, request), fields(collection = %K::COLLECTION))]
pub async fn submit_document<K: ContentKind>(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    request: web::Json<SubmitRequest<K::Draft>>,
) -> Result<impl Responder, AppError> {
    let request = request.into_inner();
    let editing_id = optional_uuid(request.editing_id.as_deref())?;

    let document = state.content_handler::<K>()
        .submit(request.draft, editing_id)
        .await?;

    let response = match editing_id {
        Some(_) => HttpResponse::Ok().json(document),
        None => HttpResponse::Created().json(document),
    };
    Ok(response)
}

/// Multipart flavour of submit: a `file` part, a `draft` part holding the
/// draft as JSON and an optional `editingId` part.
#[instrument(skip(_claims, state, payload), fields(collection = %K::COLLECTION))]
pub async fn submit_document_with_upload<K: ContentKind>(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<impl Responder, AppError> {
    let mut form = read_upload_form(payload, state.config.max_upload_bytes).await?;

    let file = form.file
        .take()
        .ok_or_else(|| AppError::InvalidInput("Missing 'file' part".into()))?;
    let draft_json = form.fields
        .get("draft")
        .ok_or_else(|| AppError::InvalidInput("Missing 'draft' part".into()))?;
    let draft: K::Draft = serde_json::from_str(draft_json)
        .map_err(|e| AppError::InvalidInput(format!("Invalid draft: {}", e)))?;
    let editing_id = optional_uuid(form.fields.get("editingId").map(String::as_str))?;

    let document = state.content_handler::<K>()
        .submit_with_upload(draft, editing_id, file)
        .await?;

    let response = match editing_id {
        Some(_) => HttpResponse::Ok().json(document),
        None => HttpResponse::Created().json(document),
    };
    Ok(response)
}

#[instrument(skip(_claims, state, id), fields(collection = %K::COLLECTION))]
pub async fn delete_document<K: ContentKind>(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = valid_uuid(&id)?;
    let outcome = state.content_handler::<K>().delete(&id).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

#[instrument(skip(_claims, state, payload), fields(collection = %K::COLLECTION))]
pub async fn upload_image<K: ContentKind>(
    _claims: AdminClaims,
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<impl Responder, AppError> {
    let form = read_upload_form(payload, state.config.max_upload_bytes).await?;
    let file = form.file
        .ok_or_else(|| AppError::InvalidInput("Missing 'file' part".into()))?;

    let upload = state.content_handler::<K>().upload_image(file).await?;
    Ok(HttpResponse::Created().json(upload))
}
