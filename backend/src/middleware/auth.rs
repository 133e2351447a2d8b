//! Bearer-token gate for the protected routes.

use crate::auth::AuthError;
use crate::context::AppContext;
use crate::error::ApiError;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};

/// Identity of the authenticated caller; every patient and payment operation is scoped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl Owner {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extract the token from `Authorization: Bearer <token>` (scheme is case-insensitive).
fn bearer_token(req: &ServiceRequest) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::MissingBearer)?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim().to_string())
        }
        _ => Err(AuthError::MissingBearer),
    }
}

/// Verify the bearer token and attach the caller's [`Owner`] to the request.
///
/// Rejections are answered here with `401` and never reach the handler.
pub async fn require_bearer<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let owner = match authenticate(&req) {
        Ok(owner) => owner,
        Err(e) => return Ok(req.error_response(e).map_into_right_body()),
    };
    req.extensions_mut().insert(owner);
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

fn authenticate(req: &ServiceRequest) -> Result<Owner, ApiError> {
    let token = bearer_token(req)?;
    let ctx = req
        .app_data::<web::Data<AppContext>>()
        .ok_or_else(|| ApiError::Storage("application context missing".to_string()))?;
    let claims = ctx.tokens.verify(&token).map_err(|e| {
        log::debug!("rejected bearer token: {}", e);
        ApiError::Auth("invalid token".to_string())
    })?;
    Ok(Owner(claims.sub))
}
