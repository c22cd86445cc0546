use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Seconds a health report is served from cache.
pub const HEALTH_CACHE_SECS: i64 = 5;

/// Operator name written into tokens minted without an explicit subject.
pub const DEFAULT_TOKEN_SUBJECT: &str = "portfolio-admin";
