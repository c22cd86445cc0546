use std::sync::Arc;

use validator::Validate;

use crate::{
    entities::contact::{ContactForm, ContactResponse, OutgoingEmail},
    errors::{AppError, EmailError},
    limiter::rate_limiter::{RateDecision, RateLimiterStore},
    repositories::email_sender::EmailSender,
    utils::email_html::render_contact_email,
};

pub const CONTACT_SUCCESS_MESSAGE: &str = "Thanks for reaching out! I'll get back to you soon.";

/// Validates, rate limits and forwards contact form submissions by email.
pub struct ContactHandler {
    sender: Arc<dyn EmailSender>,
    limiter: RateLimiterStore,
}

impl ContactHandler {
    pub fn new(sender: Arc<dyn EmailSender>, limiter: RateLimiterStore) -> Self {
        ContactHandler { sender, limiter }
    }

    pub fn limiter(&self) -> &RateLimiterStore {
        &self.limiter
    }

    #[tracing::instrument(skip(self, form), fields(client_ip = %client_ip))]
    pub async fn submit(&self, form: ContactForm, client_ip: &str) -> Result<ContactResponse, AppError> {
        form.validate()?;

        let email_key = format!("email:{}", form.email.trim().to_lowercase());
        let ip_key = format!("ip:{}", client_ip);

        let keys = [ip_key, email_key];
        for key in &keys {
            if let RateDecision::Limited { retry_after_secs } = self.limiter.peek(key) {
                tracing::warn!("Contact form rate limited for {}", key);
                return Err(AppError::RateLimited(format!(
                    "Too many messages, please try again in {} seconds",
                    retry_after_secs
                )));
            }
        }

        let recipient = self.sender.recipient().ok_or_else(|| {
            tracing::error!("Contact form submitted but no recipient is configured");
            AppError::InternalError(EmailError::NotConfigured.to_string())
        })?;

        let email = OutgoingEmail {
            to: recipient,
            reply_to: form.email.trim().to_string(),
            subject: format!("Portfolio contact: {}", form.subject.trim()),
            html: render_contact_email(&form),
        };

        self.sender.send(&email).await.map_err(|e| {
            tracing::error!("Failed to send contact email: {}", e);
            AppError::InternalError(e.to_string())
        })?;

        // only delivered messages count against the limit
        for key in &keys {
            self.limiter.record(key);
        }

        Ok(ContactResponse::ok(CONTACT_SUCCESS_MESSAGE))
    }
}
