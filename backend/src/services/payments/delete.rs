//! # Payment Deletion Service
//!
//! Handles `DELETE /payments/{id}`. The delete is scoped to the caller, so another owner's
//! payment is reported as missing and left in place.

use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use actix_web::{web, HttpResponse};
use serde_json::json;

/// Actix handler for `DELETE /payments/{id}`.
///
/// # Arguments
/// * `id` - The payment id, from the URL path.
///
/// # Returns
/// - `200 OK` with `{"success": true}`.
/// - `404 Not Found` when no payment of the caller has that id.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let owner = owner.into_inner();
    let id = id.into_inner();
    let deleted = id.clone();
    ctx.run(move |ctx| ctx.payments.delete(owner.as_str(), &id))
        .await?;
    log::info!("deleted payment {}", deleted);
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
