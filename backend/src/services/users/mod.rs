//! # User Service Module
//!
//! Routes under `/users`, behind the bearer-token gate.
//!
//! ## Registered Routes:
//!
//! *   **`POST /users`** (`create::process`): creates a login. Answers `201` with the user,
//!     `409` when the username is taken.

mod create;

use crate::middleware::auth::require_bearer;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::web::{post, scope};

const API_PATH: &str = "/users";

pub fn configure_routes() -> impl HttpServiceFactory {
    scope(API_PATH)
        .wrap(from_fn(require_bearer))
        .route("", post().to(create::process))
}
