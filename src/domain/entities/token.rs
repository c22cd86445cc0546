use serde::{ Serialize, Deserialize };

#[derive(Debug, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: usize,
}

impl IssuedToken {
    pub fn new(access_token: String, expires_at: usize) -> Self {
        IssuedToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }
}

/// Claims carried by an admin bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Who the token was issued to, e.g. an operator name.
    pub sub: String,
    pub admin: bool,
    pub exp: usize,
    pub iat: usize,
}
