use crate::context::AppContext;
use crate::error::ApiError;
use crate::middleware::auth::Owner;
use crate::services::auth::register;
use actix_web::{web, HttpResponse};
use common::requests::NewUserRequest;

/// Actix handler for `POST /users`: an authenticated user creates another login.
///
/// Same body and responses as `POST /auth/register`.
pub async fn process(
    ctx: web::Data<AppContext>,
    owner: web::ReqData<Owner>,
    payload: web::Json<NewUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    log::info!("'{}' is creating user '{}'", owner.as_str(), request.username.trim());
    register::create_user(&ctx, request).await
}
