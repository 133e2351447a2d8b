//! # Patient Service Module
//!
//! Routes under `/patients`. All of them sit behind the bearer-token gate, and every
//! operation is scoped to the caller's [`Owner`](crate::middleware::auth::Owner): a record
//! of another owner is reported exactly like a missing one.
//!
//! ## Registered Routes:
//!
//! *   **`POST /patients`** (`create::process`): inserts a patient. The server assigns the id
//!     when absent, defaults both timestamps to now and starts the record as `ACTIVE`.
//!     Answers `201` with the stored record.
//!
//! *   **`GET /patients`** (`list::process`): every patient of the caller, newest first.
//!
//! *   **`GET /patients/{id}`** (`get::process`): a single patient, or `404`.
//!
//! *   **`PATCH /patients/{id}`** (`update::process`): sparse update. Only the fields
//!     present in the body are written; the response is the row as stored afterwards.

mod create;
mod get;
mod list;
mod update;

use crate::middleware::auth::require_bearer;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::web::{get, patch, post, scope};

const API_PATH: &str = "/patients";

pub fn configure_routes() -> impl HttpServiceFactory {
    scope(API_PATH)
        .wrap(from_fn(require_bearer))
        .route("", post().to(create::process))
        .route("", get().to(list::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}", patch().to(update::process))
}
