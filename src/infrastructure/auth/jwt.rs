use jsonwebtoken::{encode, Header, decode, Validation, TokenData, Algorithm};
use chrono::{Utc, Duration};

use crate::entities::token::{Claims, IssuedToken};
use crate::settings::{AppConfig, JwtKeys};
use crate::errors::AuthError;

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

/// Issues and verifies the bearer tokens guarding the admin API.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            expiration: Duration::hours(config.admin_token_ttl_hours),
        }
    }

    pub fn issue_admin_token(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_with_ttl(subject, self.expiration)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, AuthError> {
        if subject.trim().is_empty() {
            return Err(AuthError::TokenCreation);
        }

        let now = Utc::now();
        let exp = (now + ttl).timestamp().max(0) as usize;

        let claims = Claims {
            sub: subject.trim().to_string(),
            admin: true,
            exp,
            iat: now.timestamp().max(0) as usize,
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|e| {
                tracing::error!("Failed to sign admin token: {}", e);
                AuthError::TokenCreation
            })?;

        Ok(IssuedToken::new(token, exp))
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &self.keys.decoding,
            &validation
        )
        .map_err(AuthError::from)
    }
}
