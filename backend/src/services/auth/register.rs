//! # User Registration Service
//!
//! Backs both `POST /auth/register` (public) and `POST /users` (bearer token required).
//! The two differ only in who may call them; the account they create is the same.
//!
//! The password is hashed with argon2 on the blocking pool, then the user is inserted. A
//! username that is already taken answers `409` and leaves the existing credential intact.

use crate::auth::{register_user, AuthError};
use crate::context::AppContext;
use crate::error::ApiError;
use crate::store::StoreError;
use actix_web::{web, HttpResponse};
use common::requests::NewUserRequest;

/// Actix handler for `POST /auth/register`.
///
/// # Arguments
/// * `payload` - `{"username", "password"}`; both must be non-blank.
///
/// # Returns
/// - `201 Created` with the new user (id, username, created time; never the hash).
/// - `400 Bad Request` for a blank username or password.
/// - `409 Conflict` when the username exists.
pub async fn process(
    ctx: web::Data<AppContext>,
    payload: web::Json<NewUserRequest>,
) -> Result<HttpResponse, ApiError> {
    create_user(&ctx, payload.into_inner()).await
}

pub(crate) async fn create_user(
    ctx: &AppContext,
    request: NewUserRequest,
) -> Result<HttpResponse, ApiError> {
    let username = request.username.trim().to_string();
    let password = request.password;
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("username and password are required".to_string()));
    }

    let outcome = ctx
        .run(move |ctx| Ok(register_user(&ctx.users, &username, &password)))
        .await?;
    match outcome {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(AuthError::Store(StoreError::Conflict(_))) => {
            Err(ApiError::Conflict("username already exists".to_string()))
        }
        Err(e) => Err(ApiError::from(e)),
    }
}
