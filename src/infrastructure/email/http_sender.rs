use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::{
    entities::contact::OutgoingEmail,
    errors::EmailError,
    repositories::email_sender::EmailSender,
    settings::AppConfig,
};

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Posts mail to a Resend-compatible HTTP API.
pub struct HttpEmailSender {
    client: Client,
    api_url: String,
    api_key: Zeroizing<String>,
    from: String,
    recipient: String,
}

impl HttpEmailSender {
    pub fn new(api_url: String, api_key: String, from: String, recipient: String) -> Result<Self, EmailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(HttpEmailSender {
            client,
            api_url,
            api_key: Zeroizing::new(api_key),
            from,
            recipient,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, EmailError> {
        let api_key = config.email_api_key.clone().ok_or(EmailError::NotConfigured)?;
        let recipient = config.contact_recipient.clone().ok_or(EmailError::NotConfigured)?;

        Self::new(config.email_api_url.clone(), api_key, config.email_from.clone(), recipient)
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let body = SendEmailRequest {
            from: &self.from,
            to: [&email.to],
            reply_to: &email.reply_to,
            subject: &email.subject,
            html: &email.html,
        };

        let response = self.client
            .post(&self.api_url)
            .bearer_auth(self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Contact email accepted by provider ({})", status.as_u16());
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(EmailError::Rejected { status: status.as_u16(), body })
    }

    fn recipient(&self) -> Option<String> {
        Some(self.recipient.clone())
    }
}
