//! # Payment Update Service
//!
//! Handles `PATCH /payments/{id}`: writes only the fields present in the body and answers
//! with the row as stored afterwards.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};
use common::model::PaymentUpdate;

/// Actix handler for `PATCH /payments/{id}`.
///
/// # Arguments
/// * `id` - The payment id, from the URL path.
/// * `payload` - Any of `amount`, `mode`, `date`. An empty body changes nothing.
///
/// # Returns
/// - `200 OK` with the updated payment.
/// - `404 Not Found` when no payment of the caller has that id.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    id: web::Path<String>,
    payload: web::Json<PaymentUpdate>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let id = id.into_inner();
    let upd = payload.into_inner();
    let payment = ctx
        .run(move |ctx| ctx.payments.update(owner.as_str(), &id, &upd))
        .await?;
    log::info!("updated payment {}", payment.id);
    Ok(HttpResponse::Ok().json(payment))
}
