//! # Patient Listing Service
//!
//! Handles `GET /patients`: all of the caller's patients, newest creation time first.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};

/// Actix handler for `GET /patients`.
///
/// # Returns
/// - `200 OK` with a JSON array, possibly empty.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let patients = ctx.run(move |ctx| ctx.patients.list(owner.as_str())).await?;
    Ok(HttpResponse::Ok().json(patients))
}
