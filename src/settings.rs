use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::{env, fmt, str::FromStr};
use zeroize::Zeroizing;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

/// Where documents live.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

/// Where uploaded files live.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    Local,
    Memory,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_blob_backend")]
    pub blob_backend: BlobBackend,

    #[serde(default = "default_blob_dir")]
    pub blob_dir: String,

    #[serde(default = "default_public_media_url")]
    pub public_media_url: String,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub admin_jwt_secret: String,

    #[serde(default = "default_admin_token_ttl")]
    pub admin_token_ttl_hours: i64,

    #[serde(default = "default_email_api_url")]
    pub email_api_url: String,

    #[serde(default)]
    pub email_api_key: Option<String>,

    #[serde(default = "default_email_from")]
    pub email_from: String,

    #[serde(default)]
    pub contact_recipient: Option<String>,

    #[serde(default = "default_contact_limit")]
    pub contact_limit_per_hour: u64,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_orphan_sweep_interval")]
    pub orphan_sweep_interval_secs: u64,

    #[serde(default = "default_orphan_grace")]
    pub orphan_grace_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-Content-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}
fn default_blob_backend() -> BlobBackend {
    BlobBackend::Local
}
fn default_blob_dir() -> String {
    "uploads".to_string()
}
fn default_public_media_url() -> String {
    "http://127.0.0.1:8080/media".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_admin_token_ttl() -> i64 {
    12
}
fn default_email_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}
fn default_email_from() -> String {
    "Portfolio Contact <onboarding@resend.dev>".to_string()
}
fn default_contact_limit() -> u64 {
    2
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_orphan_sweep_interval() -> u64 {
    60 * 60
}
fn default_orphan_grace() -> u64 {
    60 * 60
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true)
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // DATABASE_URL is the conventional name for tooling such as sqlx-cli
        if config.database_url.is_none() {
            config.database_url = env::var("DATABASE_URL").ok();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.store_backend == StoreBackend::Postgres
            && self.database_url.as_deref().is_none_or(|url| url.trim().is_empty())
        {
            errors.push("DATABASE_URL is required when STORE_BACKEND is postgres");
        }
        if self.admin_jwt_secret.len() < 32 {
            errors.push("ADMIN_JWT_SECRET must be at least 32 characters");
        }
        if self.blob_dir.trim().is_empty() {
            errors.push("BLOB_DIR cannot be empty");
        }
        if url::Url::parse(&self.public_media_url).is_err() {
            errors.push("PUBLIC_MEDIA_URL must be an absolute URL");
        }
        if self.contact_limit_per_hour == 0 {
            errors.push("CONTACT_LIMIT_PER_HOUR must be greater than zero");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Mail can only go out once both the API key and a recipient are known.
    pub fn email_enabled(&self) -> bool {
        self.email_api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
            && self.contact_recipient.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else if self.len() < 32 {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self {
            Some(value) if !value.is_empty() => "[REDACTED]",
            _ => "[MISSING]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("store_backend", &self.store_backend)
            .field("database_url", &self.database_url.redact())
            .field("blob_backend", &self.blob_backend)
            .field("blob_dir", &self.blob_dir)
            .field("public_media_url", &self.public_media_url)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("admin_jwt_secret", &self.admin_jwt_secret.redact())
            .field("admin_token_ttl_hours", &self.admin_token_ttl_hours)
            .field("email_api_url", &self.email_api_url)
            .field("email_api_key", &self.email_api_key.redact())
            .field("email_from", &self.email_from)
            .field("contact_recipient", &self.contact_recipient)
            .field("contact_limit_per_hour", &self.contact_limit_per_hour)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("orphan_sweep_interval_secs", &self.orphan_sweep_interval_secs)
            .field("orphan_grace_secs", &self.orphan_grace_secs)
            .finish()
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl From<&AppConfig> for JwtKeys {
    fn from(config: &AppConfig) -> Self {
        let secret = Zeroizing::new(config.admin_jwt_secret.clone());

        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("encoding", &"[REDACTED]")
            .field("decoding", &"[REDACTED]")
            .finish()
    }
}
