use async_trait::async_trait;

use crate::{
    entities::contact::OutgoingEmail,
    errors::EmailError,
    repositories::email_sender::EmailSender,
};

/// Stands in when no mail API key or recipient is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmailSender;

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        tracing::warn!("Dropping contact email '{}': mail delivery is not configured", email.subject);
        Err(EmailError::NotConfigured)
    }

    fn recipient(&self) -> Option<String> {
        None
    }
}
