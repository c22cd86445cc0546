use actix_web::{error::InternalError, web, HttpResponse, ResponseError};

use super::json_error::{JsonError, JSON_LIMIT_BYTES};
use crate::{entities::contact::ContactResponse, handlers::contact};

const INVALID_BODY_MESSAGE: &str = "The message could not be read. Please check the form and try again.";

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/contact")
            .app_data(contact_json_config())
            .route(web::post().to(contact::send_contact_message))
    );
}

/// Body errors on the contact form keep the `{ success, message }` shape.
fn contact_json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            tracing::debug!("Unreadable contact form body: {}", err);
            let status = JsonError::from(err).status_code();
            let response = HttpResponse::build(status).json(ContactResponse::failed(INVALID_BODY_MESSAGE));
            InternalError::from_response(INVALID_BODY_MESSAGE, response).into()
        })
}
