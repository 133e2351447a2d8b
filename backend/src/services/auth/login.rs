//! # Login Service
//!
//! Handles `POST /auth/login`. The argon2 check runs on the blocking pool.

use crate::auth::verify_password;
use crate::context::AppContext;
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use common::requests::{LoginRequest, LoginResponse};

/// Actix handler for `POST /auth/login`.
///
/// An unknown user and a wrong password produce the same `401`.
pub async fn process(
    ctx: web::Data<AppContext>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let LoginRequest { username, password } = payload.into_inner();
    if username.trim().is_empty() || password.is_empty() {
        return Err(ApiError::Validation("username and password are required".to_string()));
    }

    let lookup = username.clone();
    let user = match ctx.run(move |ctx| ctx.users.get_by_username(&lookup)).await {
        Ok(user) => user,
        Err(ApiError::NotFound) => return Err(invalid_credentials(&username)),
        Err(e) => return Err(e),
    };

    let hash = user.password_hash;
    let matches = web::block(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Storage(format!("credential check failed: {}", e)))?;
    if !matches {
        return Err(invalid_credentials(&username));
    }

    let token = ctx.tokens.issue(&user.username)?;
    log::info!("issued token for '{}'", user.username);
    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}

fn invalid_credentials(username: &str) -> ApiError {
    log::warn!("failed login for '{}'", username);
    ApiError::from(crate::auth::AuthError::InvalidCredentials)
}

