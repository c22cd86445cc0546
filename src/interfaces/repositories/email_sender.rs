use async_trait::async_trait;

use crate::{entities::contact::OutgoingEmail, errors::EmailError};

/// Outgoing transactional mail.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;

    /// Address every contact message is delivered to, when one is configured.
    fn recipient(&self) -> Option<String>;
}
