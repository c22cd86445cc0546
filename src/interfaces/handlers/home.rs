use actix_web::{get, web, HttpResponse, Responder};

use crate::{entities::document::Collection, AppState};

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    let collections: Vec<&str> = Collection::ALL.iter().map(Collection::as_str).collect();

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Portfolio content API",
        "name": state.config.name,
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "collections": collections,
        "content": "/api/v1/content/{collection}",
        "health": "/health"
    }))
}
