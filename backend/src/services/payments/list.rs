//! # Payment Listing Service
//!
//! Handles `GET /payments?patient_id=`.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};
use common::requests::PaymentListQuery;

/// Actix handler for `GET /payments`.
///
/// # Arguments
/// * `query` - Optional `patient_id`. Absent, empty or `ALL` lists every payment of the
///   caller.
///
/// # Returns
/// - `200 OK` with the payments, latest `date` first.
/// - `400 Bad Request` for an unparseable query string.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    query: web::Query<PaymentListQuery>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let filter = query.into_inner().patient_id.unwrap_or_default();
    let payments = ctx
        .run(move |ctx| ctx.payments.list(owner.as_str(), &filter))
        .await?;
    Ok(HttpResponse::Ok().json(payments))
}
