//! Error taxonomy of the HTTP surface.

use crate::auth::AuthError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("not found")]
    NotFound,

    /// The resource already exists. Only raised where a handler asks for it; a store
    /// conflict elsewhere stays a storage failure.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Storage(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::ForeignKey(detail) => {
                log::warn!("referential integrity violation: {}", detail);
                ApiError::Storage("referenced patient does not exist".to_string())
            }
            other => {
                log::error!("storage failure: {}", other);
                ApiError::Storage("storage failure".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => ApiError::from(e),
            AuthError::Hashing(msg) => {
                log::error!("password hashing failed: {}", msg);
                ApiError::Storage("credential processing failed".to_string())
            }
            AuthError::ExpiryOutOfRange => {
                log::error!("token expiry is out of range");
                ApiError::Storage("token issuance failed".to_string())
            }
            other => ApiError::Auth(other.to_string()),
        }
    }
}
