//! # Patient Retrieval Service
//!
//! Handles `GET /patients/{id}`, scoped to the caller.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};

/// Actix handler for `GET /patients/{id}`.
///
/// # Arguments
/// * `id` - The patient id, from the URL path.
///
/// # Returns
/// - `200 OK` with the patient.
/// - `404 Not Found` when the id is unknown or belongs to another owner.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let id = id.into_inner();
    let patient = ctx
        .run(move |ctx| ctx.patients.get_by_id(owner.as_str(), &id))
        .await?;
    Ok(HttpResponse::Ok().json(patient))
}
