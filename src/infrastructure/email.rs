use std::sync::Arc;

use crate::{repositories::email_sender::EmailSender, settings::AppConfig};

pub mod disabled;
pub mod http_sender;

/// The HTTP sender when mail is fully configured, otherwise one that
/// refuses every message.
pub fn email_sender_from_config(config: &AppConfig) -> Arc<dyn EmailSender> {
    if !config.email_enabled() {
        tracing::warn!("Email API key or contact recipient missing; contact form will answer 500");
        return Arc::new(disabled::DisabledEmailSender);
    }

    match http_sender::HttpEmailSender::from_config(config) {
        Ok(sender) => Arc::new(sender),
        Err(e) => {
            tracing::error!("Could not build email sender: {}", e);
            Arc::new(disabled::DisabledEmailSender)
        }
    }
}
