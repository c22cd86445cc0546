use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use tracing::instrument;

use crate::{
    entities::contact::{ContactForm, ContactResponse},
    errors::AppError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

const SEND_FAILED_MESSAGE: &str = "Sorry, your message could not be sent. Please try again later.";

/// Always answers with `{ success, message }`, plus field errors on 400.
#[instrument(skip(state, req, form))]
pub async fn send_contact_message(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Json<ContactForm>,
) -> HttpResponse {
    let client_ip = get_client_ip(&req, state.config.trust_x_forwarded_for);

    match state.contact_handler.submit(form.into_inner(), &client_ip).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(AppError::ValidationError(errors)) => {
            HttpResponse::BadRequest().json(ContactResponse::invalid(errors))
        }
        Err(AppError::RateLimited(message)) => {
            HttpResponse::TooManyRequests().json(ContactResponse::failed(message))
        }
        Err(e) => {
            tracing::error!("Contact message failed: {}", e);
            HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR)
                .json(ContactResponse::failed(SEND_FAILED_MESSAGE))
        }
    }
}
