//! # Patient Creation Service
//!
//! Handles `POST /patients`. The repository fills in what the client may leave out: the id,
//! both timestamps and the `ACTIVE` status. The record is stamped with the caller as owner.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};
use common::model::Patient;

/// Actix handler for `POST /patients`.
///
/// # Arguments
/// * `owner` - The authenticated caller, inserted by the bearer gate.
/// * `payload` - The patient fields; `id` and the times are optional; status always starts as `ACTIVE`.
///
/// # Returns
/// - `201 Created` with the stored patient.
/// - `400 Bad Request` for a malformed body.
/// - `500 Internal Server Error` when the store fails (including a duplicate client id).
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    payload: web::Json<Patient>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let patient = payload.into_inner();
    let created = ctx
        .run(move |ctx| ctx.patients.create(owner.as_str(), patient))
        .await?;
    log::info!("created patient {}", created.id);
    Ok(HttpResponse::Created().json(created))
}
