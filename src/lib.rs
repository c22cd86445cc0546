use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod content_store;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, gallery, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, email, limiter, storage, utils};

use auth::jwt::JwtService;
use content_store::ContentStore;
use entities::document::ContentKind;
use limiter::rate_limiter::RateLimiterStore;
use repositories::email_sender::EmailSender;
use use_cases::{contact::ContactHandler, content::ContentHandler};

pub struct AppState {
    pub config: settings::AppConfig,
    pub content: ContentStore,
    pub contact_handler: ContactHandler,
    pub token_service: JwtService,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        content: ContentStore,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        let limiter = RateLimiterStore::per_hour(config.contact_limit_per_hour);

        AppState {
            config: config.clone(),
            content,
            contact_handler: ContactHandler::new(email_sender, limiter),
            token_service: JwtService::new(config),
        }
    }

    /// Create, update, delete and upload for one collection.
    pub fn content_handler<K: ContentKind>(&self) -> ContentHandler<K> {
        ContentHandler::new(self.content.clone(), self.config.max_upload_bytes)
    }
}
