use actix_web::web::{get, scope};
use actix_web::{HttpResponse, Responder, Scope};
use serde_json::json;

const API_PATH: &str = "/health";

/// `GET /health` always answers `{"status":"ok"}` once the server is accepting requests.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

async fn process() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
