use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{entities::token::Claims, errors::AuthError, AppState};

/// Admin identity of a request. Normally placed on the request by
/// `AdminGuard`; when the guard is not mounted the bearer token is verified
/// here instead.
///
/// Rejects with 401 without a valid token and 403 for a non-admin token.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl AdminClaims {
    pub fn subject(&self) -> &str {
        &self.0.sub
    }

    fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        if !claims.admin {
            return Err(AuthError::Forbidden("Admin access required".into()));
        }
        Ok(AdminClaims(claims))
    }
}

/// The token of an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() && !token.contains(' ')).then_some(token)
}

fn admin_claims(req: &HttpRequest) -> Result<AdminClaims, AuthError> {
    if let Some(claims) = req.extensions().get::<Claims>() {
        return AdminClaims::from_claims(claims.clone());
    }

    let state = req.app_data::<web::Data<AppState>>().ok_or(AuthError::MissingTokenService)?;
    let token = bearer_token(req).ok_or(AuthError::MissingCredentials)?;
    AdminClaims::from_claims(state.token_service.decode_jwt(token)?.claims)
}

impl FromRequest for AdminClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(admin_claims(req).map_err(actix_web::Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_bearer_token() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));
    }

    #[test]
    fn ignores_other_schemes() {
        let basic = TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwdw=="))
            .to_http_request();
        let empty = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(bearer_token(&basic), None);
        assert_eq!(bearer_token(&empty), None);
    }

    #[test]
    fn claims_from_guard_are_checked_for_admin() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims {
            sub: "visitor".into(),
            admin: false,
            exp: usize::MAX,
            iat: 0,
        });
        assert!(matches!(admin_claims(&req), Err(AuthError::Forbidden(_))));
    }
}
