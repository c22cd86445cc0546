use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{entities::token::Claims, errors::AuthError, use_cases::extractors::bearer_token, AppState};

/// Every path under this prefix needs an admin bearer token.
pub const ADMIN_PATH_PREFIX: &str = "/api/v1/admin";

pub struct AdminGuard;

impl<S> Transform<S, ServiceRequest> for AdminGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminGuardService {
            service: Rc::new(service),
        })
    }
}

pub struct AdminGuardService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AdminGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if is_public_route(req.path(), req.method().as_str()) {
                return service.call(req).await;
            }

            let claims = match verify_request(&req) {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::warn!("Rejected admin request to {}: {}", req.path(), e);
                    let response = e.error_response();
                    return Ok(req.into_response(response));
                }
            };

            if let Err(e) = enforce_admin_access(&claims) {
                tracing::warn!("Token for '{}' lacks admin access to {}", claims.sub, req.path());
                let response = e.error_response();
                return Ok(req.into_response(response));
            }

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }
    !path.starts_with(ADMIN_PATH_PREFIX)
}

fn verify_request(req: &ServiceRequest) -> Result<Claims, AuthError> {
    let state = req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| {
            tracing::error!("AppState missing in admin guard");
            AuthError::MissingTokenService
        })?;

    let token = bearer_token(req.request()).ok_or(AuthError::MissingCredentials)?;
    let decoded = state.token_service.decode_jwt(token)?;
    Ok(decoded.claims)
}

fn enforce_admin_access(claims: &Claims) -> Result<(), AuthError> {
    if !claims.admin {
        return Err(AuthError::Forbidden("Admin access required".into()));
    }
    Ok(())
}
