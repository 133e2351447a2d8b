//! # Payment Recording Service
//!
//! Handles `POST /payments`. The mode is normalized and the id assigned by the repository.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};
use common::model::Payment;

/// Actix handler for `POST /payments`.
///
/// Only the existence of the referenced patient is checked, not that it belongs to the
/// caller.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    payload: web::Json<Payment>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let payment = payload.into_inner();
    if payment.patient_id.trim().is_empty() {
        return Err(ApiError::Validation("patient_id is required".to_string()));
    }
    let created = ctx
        .run(move |ctx| ctx.payments.create(owner.as_str(), payment))
        .await?;
    log::info!("recorded payment {} for patient {}", created.id, created.patient_id);
    Ok(HttpResponse::Created().json(created))
}
