use actix_web::{get, web, HttpResponse, Responder};

use crate::{
    use_cases::{extractors::AdminClaims, live::DashboardQuery},
    utils::sse::sse_response,
    AppState,
};

/// Whether the content store is configured and answering.
#[get("/status")]
pub async fn store_status(
    claims: AdminClaims,
    state: web::Data<AppState>,
) -> impl Responder {
    tracing::debug!("Store status requested by {}", claims.subject());
    let status = state.content.status().await;
    HttpResponse::Ok().json(status)
}

/// Live document counts for the dashboard collections.
#[get("/dashboard/live")]
pub async fn dashboard_live(
    _claims: AdminClaims,
    state: web::Data<AppState>,
) -> impl Responder {
    let counts = DashboardQuery::new(state.content.documents.clone()).stream();
    sse_response(counts)
}
