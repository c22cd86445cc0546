#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use mockall::mock;
use portfolio_content::{
    content_store::ContentStore,
    entities::{contact::OutgoingEmail, token::Claims},
    errors::{BlobError, EmailError},
    email::disabled::DisabledEmailSender,
    middlewares::auth::AdminGuard,
    repositories::{
        blob_store::BlobStore,
        document_store::DocumentStore,
        email_sender::EmailSender,
        memory_store::MemoryDocumentStore,
    },
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment, BlobBackend, StoreBackend},
    storage::memory::MemoryBlobStore,
    AppState,
};
use reqwest::Client;
use serde_json::Value;
use std::{net::TcpListener, sync::Arc, time::Duration};

pub const TEST_SECRET: &str = "test_admin_secret_that_is_long_enough_for_hs512_1234567890";

mock! {
    pub Sender {}

    #[async_trait]
    impl EmailSender for Sender {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
        fn recipient(&self) -> Option<String>;
    }
}

mock! {
    pub Blobs {}

    #[async_trait]
    impl BlobStore for Blobs {
        async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), BlobError>;
        async fn delete(&self, path: &str) -> Result<(), BlobError>;
        async fn read(&self, path: &str) -> Result<(Vec<u8>, String), BlobError>;
        async fn list(&self, prefix: &str) -> Result<Vec<String>, BlobError>;
        fn public_url(&self, path: &str) -> String;
        fn path_from_url(&self, url: &str) -> Option<String>;
        fn backend_name(&self) -> &'static str;
    }
}

/// A sender that accepts everything and delivers to a fixed inbox.
pub fn accepting_sender() -> MockSender {
    let mut sender = MockSender::new();
    sender.expect_recipient().returning(|| Some("owner@example.com".to_string()));
    sender.expect_send().returning(|_| Ok(()));
    sender
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub state: web::Data<AppState>,
    pub documents: Arc<MemoryDocumentStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_sender(Arc::new(DisabledEmailSender)).await
    }

    pub async fn spawn_with_sender(sender: Arc<dyn EmailSender>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let config = test_config(&address);
        let documents = Arc::new(MemoryDocumentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new(config.public_media_url.clone()));
        let content = ContentStore::new(
            documents.clone() as Arc<dyn DocumentStore>,
            blobs.clone() as Arc<dyn BlobStore>,
        );

        let state = web::Data::new(AppState::new(&config, content, sender));

        let server_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(server_state.clone())
                .wrap(AdminGuard)
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .disable_signals()
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&address).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            config,
            state,
            documents,
            blobs,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn admin_token(&self) -> String {
        self.state
            .token_service
            .issue_admin_token("test-admin")
            .expect("Failed to issue admin token")
            .access_token
    }

    /// A correctly signed token whose claims do not grant admin access.
    pub fn non_admin_token(&self) -> String {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "visitor".to_string(),
            admin: false,
            exp: now + 3600,
            iat: now,
        };
        encode(
            &Header::new(jsonwebtoken::Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    pub async fn admin_post(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(self.admin_token())
            .json(body)
            .send()
            .await
            .expect("Failed to send admin request")
    }

    pub async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Response was not JSON")
    }
}

pub fn test_config(address: &str) -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Content Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        store_backend: StoreBackend::Memory,
        database_url: None,
        blob_backend: BlobBackend::Memory,
        blob_dir: "uploads".to_string(),
        public_media_url: format!("{}/media", address),
        cors_allowed_origins: vec!["*".to_string()],
        admin_jwt_secret: TEST_SECRET.to_string(),
        admin_token_ttl_hours: 1,
        email_api_url: "http://127.0.0.1:9/emails".to_string(),
        email_api_key: None,
        email_from: "Portfolio Test <test@example.com>".to_string(),
        contact_recipient: None,
        contact_limit_per_hour: 2,
        trust_x_forwarded_for: false,
        max_upload_bytes: 1024 * 1024,
        orphan_sweep_interval_secs: 3600,
        orphan_grace_secs: 3600,
    }
}

/// Smallest byte sequence `infer` recognises as a PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 1, 0, 0, 0, 1]);
    bytes
}
