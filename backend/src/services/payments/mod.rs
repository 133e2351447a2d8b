//! # Payment Service Module
//!
//! Routes under `/payments`, all behind the bearer-token gate and scoped to the caller.
//!
//! ## Registered Routes:
//!
//! *   **`POST /payments`** (`create::process`): records a payment against an existing
//!     patient. The mode is upper-cased and trimmed, the date normalized to UTC.
//!
//! *   **`GET /payments?patient_id=`** (`list::process`): payments, latest date first.
//!     Without `patient_id`, or with `patient_id=ALL`, every payment of the caller is listed.
//!
//! *   **`PATCH /payments/{id}`** (`update::process`): sparse update of amount, mode and date.
//!
//! *   **`DELETE /payments/{id}`** (`delete::process`): hard delete; answers
//!     `{"success": true}`.

mod create;
mod delete;
mod list;
mod update;

use crate::middleware::auth::require_bearer;
use actix_web::dev::HttpServiceFactory;
use actix_web::middleware::from_fn;
use actix_web::web::{delete, get, patch, post, scope};

const API_PATH: &str = "/payments";

pub fn configure_routes() -> impl HttpServiceFactory {
    scope(API_PATH)
        .wrap(from_fn(require_bearer))
        .route("", post().to(create::process))
        .route("", get().to(list::process))
        .route("/{id}", patch().to(update::process))
        .route("/{id}", delete().to(delete::process))
}
