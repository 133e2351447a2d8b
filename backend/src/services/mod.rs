//! # HTTP services
//!
//! Each sub-module owns one resource and exposes `configure_routes`, which returns the
//! actix scope for that resource:
//!
//! - `auth`: credential login and self-registration (public).
//! - `health`: liveness check (public).
//! - `patients`: owner-scoped patient records (bearer token required).
//! - `payments`: owner-scoped payments (bearer token required).
//! - `users`: creation of further logins (bearer token required).

pub mod auth;
pub mod health;
pub mod patients;
pub mod payments;
pub mod users;

use crate::error::ApiError;
use actix_web::web;

/// Largest JSON body accepted by any endpoint.
const JSON_LIMIT: usize = 1024 * 1024;

/// JSON extractor settings: decode failures surface as `400 {"error": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| ApiError::Validation(format!("invalid payload: {}", err)).into())
}

/// Query-string extractor settings, same error shape as [`json_config`].
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| ApiError::Validation(format!("invalid query: {}", err)).into())
}

/// Register every service on an app or test app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(health::configure_routes())
        .service(auth::configure_routes())
        .service(patients::configure_routes())
        .service(payments::configure_routes())
        .service(users::configure_routes());
}
