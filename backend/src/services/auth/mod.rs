//! # Auth Service Module
//!
//! Public routes under `/auth`:
//!
//! *   **`POST /auth/login`** (`login::process`): exchanges a username and password for a
//!     signed bearer token naming the user as owner.
//!
//! *   **`POST /auth/register`** (`register::process`): creates a login. The same handler
//!     logic backs the protected `POST /users`.

mod login;
pub(crate) mod register;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", post().to(login::process))
        .route("/register", post().to(register::process))
}
