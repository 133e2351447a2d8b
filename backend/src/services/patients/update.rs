//! # Patient Update Service
//!
//! Handles `PATCH /patients/{id}`.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};
use common::model::PatientUpdate;

/// Actix handler for `PATCH /patients/{id}`.
///
/// The write and the re-read are separate statements; a concurrent update landing between
/// them is visible in the response.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    id: web::Path<String>,
    payload: web::Json<PatientUpdate>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let id = id.into_inner();
    let upd = payload.into_inner();
    let patient = ctx
        .run(move |ctx| ctx.patients.update(owner.as_str(), &id, &upd))
        .await?;
    log::info!("updated patient {}", patient.id);
    Ok(HttpResponse::Ok().json(patient))
}
