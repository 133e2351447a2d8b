use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use clinic_backend::auth::{seed_user, TokenService};
use clinic_backend::context::AppContext;
use clinic_backend::services;
use clinic_backend::store::schema::{bootstrap, DEFAULT_LEGACY_OWNER};
use clinic_backend::store::{Store, UserRepo};
use serde_json::{json, Value};
use std::time::Duration;

const SECRET: &[u8] = b"integration-secret";
const ISSUER: &str = "phsio-track";

fn context() -> web::Data<AppContext> {
    let store = Store::open_in_memory().unwrap();
    bootstrap(&store.conn().unwrap(), DEFAULT_LEGACY_OWNER).unwrap();
    let users = UserRepo::new(store.clone());
    seed_user(&users, "clinic-a", "pass-a").unwrap();
    seed_user(&users, "clinic-b", "pass-b").unwrap();
    let tokens = TokenService::new(SECRET, ISSUER, chrono::Duration::minutes(5));
    web::Data::new(AppContext::new(store, tokens, Duration::from_secs(5)))
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(context())
                .configure(services::configure),
        )
        .await
    };
}

macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": $username, "password": $password }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_health() {
    let app = app!();
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn test_login_rejects_bad_credentials() {
    let app = app!();
    for (user, pass) in [("clinic-a", "wrong"), ("nobody", "pass-a")] {
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": user, "password": pass }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn test_login_token_carries_username() {
    let app = app!();
    let token = login!(app, "clinic-a", "pass-a");
    let tokens = TokenService::new(SECRET, ISSUER, chrono::Duration::minutes(5));
    assert_eq!(tokens.verify(&token).unwrap().sub, "clinic-a");
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let app = app!();
    let cases = [
        None,
        Some("Basic abc"),
        Some("Bearer"),
        Some("Bearer not.a.token"),
    ];
    for header in cases {
        let mut req = test::TestRequest::get().uri("/patients");
        if let Some(value) = header {
            req = req.insert_header(("Authorization", value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "header {header:?}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}

#[actix_web::test]
async fn test_foreign_algorithm_rejected() {
    let app = app!();
    let claims = json!({
        "sub": "clinic-a",
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 300,
        "iss": ISSUER,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    for header in [json!({"alg": "RS256", "typ": "JWT"}), json!({"alg": "none", "typ": "JWT"})] {
        let token = format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            payload,
            URL_SAFE_NO_PAD.encode("signature")
        );
        let req = test::TestRequest::get()
            .uri("/patients")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_expired_and_foreign_issuer_rejected() {
    let app = app!();
    let expired = TokenService::new(SECRET, ISSUER, chrono::Duration::seconds(-30))
        .issue("clinic-a")
        .unwrap();
    let foreign = TokenService::new(SECRET, "elsewhere", chrono::Duration::minutes(5))
        .issue("clinic-a")
        .unwrap();
    for token in [expired, foreign] {
        let req = test::TestRequest::get()
            .uri("/patients")
            .insert_header(bearer(&token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_patient_lifecycle() {
    let app = app!();
    let token = login!(app, "clinic-a", "pass-a");

    let req = test::TestRequest::post()
        .uri("/patients")
        .insert_header(bearer(&token))
        .set_json(json!({
            "full_name": "Asha Rao",
            "phone_number": "98450 11223",
            "age": 34,
            "status": "DISCHARGED"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 36);
    assert_eq!(created["status"], "ACTIVE");
    assert!(created.get("owner_username").is_none());
    assert_ne!(created["created_time"], "");

    let req = test::TestRequest::get()
        .uri("/patients")
        .insert_header(bearer(&token))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let req = test::TestRequest::patch()
        .uri(&format!("/patients/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "diagnosis": "L4-L5 strain" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["diagnosis"], "L4-L5 strain");
    assert_eq!(updated["full_name"], "Asha Rao");
    assert_eq!(updated["age"], 34);

    let req = test::TestRequest::get()
        .uri(&format!("/patients/{id}"))
        .insert_header(bearer(&token))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, updated);
}

#[actix_web::test]
async fn test_other_owner_sees_not_found() {
    let app = app!();
    let token_a = login!(app, "clinic-a", "pass-a");
    let token_b = login!(app, "clinic-b", "pass-b");

    let req = test::TestRequest::post()
        .uri("/patients")
        .insert_header(bearer(&token_a))
        .set_json(json!({ "full_name": "Asha Rao" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/patients/{id}"))
        .insert_header(bearer(&token_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri(&format!("/patients/{id}"))
        .insert_header(bearer(&token_b))
        .set_json(json!({ "full_name": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/patients")
        .insert_header(bearer(&token_b))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_malformed_payloads_are_bad_requests() {
    let app = app!();
    let token = login!(app, "clinic-a", "pass-a");

    let req = test::TestRequest::post()
        .uri("/patients")
        .insert_header(bearer(&token))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("invalid payload"));

    let req = test::TestRequest::post()
        .uri("/payments")
        .insert_header(bearer(&token))
        .set_json(json!({ "patient_id": "x", "amount": 1.0, "date": "next tuesday" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/payments")
        .insert_header(bearer(&token))
        .set_json(json!({ "patient_id": "  ", "amount": 1.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_payment_lifecycle() {
    let app = app!();
    let token = login!(app, "clinic-a", "pass-a");

    let req = test::TestRequest::post()
        .uri("/patients")
        .insert_header(bearer(&token))
        .set_json(json!({ "full_name": "Asha Rao" }))
        .to_request();
    let patient: Value = test::call_and_read_body_json(&app, req).await;
    let patient_id = patient["id"].as_str().unwrap().to_string();

    let mut ids = Vec::new();
    for (amount, mode, date) in [
        (500.0, " cash ", "2025-02-24T10:00:00+05:30"),
        (700.0, "upi", "2025-03-01"),
    ] {
        let req = test::TestRequest::post()
            .uri("/payments")
            .insert_header(bearer(&token))
            .set_json(json!({
                "patient_id": patient_id,
                "amount": amount,
                "mode": mode,
                "date": date
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    for uri in ["/payments", "/payments?patient_id=ALL"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&token))
            .to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["mode"], "UPI");
        assert_eq!(list[1]["mode"], "CASH");
        assert_eq!(list[1]["date"], "2025-02-24T04:30:00Z");
    }

    let req = test::TestRequest::get()
        .uri(&format!("/payments?patient_id={patient_id}"))
        .insert_header(bearer(&token))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 2);

    let req = test::TestRequest::patch()
        .uri(&format!("/payments/{}", ids[0]))
        .insert_header(bearer(&token))
        .set_json(json!({ "amount": 550.0, "mode": "card" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["amount"], 550.0);
    assert_eq!(updated["mode"], "CARD");
    assert_eq!(updated["date"], "2025-02-24T04:30:00Z");

    let req = test::TestRequest::delete()
        .uri(&format!("/payments/{}", ids[0]))
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "success": true }));

    let req = test::TestRequest::delete()
        .uri(&format!("/payments/{}", ids[0]))
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_payment_for_unknown_patient_is_storage_error() {
    let app = app!();
    let token = login!(app, "clinic-a", "pass-a");
    let req = test::TestRequest::post()
        .uri("/payments")
        .insert_header(bearer(&token))
        .set_json(json!({ "patient_id": "missing", "amount": 10.0, "mode": "cash" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_payment_delete_is_owner_scoped() {
    let app = app!();
    let token_a = login!(app, "clinic-a", "pass-a");
    let token_b = login!(app, "clinic-b", "pass-b");

    let req = test::TestRequest::post()
        .uri("/patients")
        .insert_header(bearer(&token_a))
        .set_json(json!({ "full_name": "Asha Rao" }))
        .to_request();
    let patient: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/payments")
        .insert_header(bearer(&token_a))
        .set_json(json!({ "patient_id": patient["id"], "amount": 10.0, "mode": "cash" }))
        .to_request();
    let payment: Value = test::call_and_read_body_json(&app, req).await;
    let id = payment["id"].as_str().unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/payments/{id}"))
        .insert_header(bearer(&token_b))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/payments")
        .insert_header(bearer(&token_a))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_register_then_login() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "username": "  reception ", "password": "front-desk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "reception");
    assert_eq!(body["id"].as_str().unwrap().len(), 36);
    assert!(body.get("password_hash").is_none());

    let token = login!(app, "reception", "front-desk");
    let req = test::TestRequest::get()
        .uri("/patients")
        .insert_header(bearer(&token))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list, json!([]));
}

#[actix_web::test]
async fn test_register_rejects_taken_or_blank_username() {
    let app = app!();
    let cases = [
        (json!({ "username": "clinic-a", "password": "hijack" }), StatusCode::CONFLICT),
        (json!({ "username": " ", "password": "x" }), StatusCode::BAD_REQUEST),
        (json!({ "username": "new-user", "password": "" }), StatusCode::BAD_REQUEST),
        (json!({ "username": "new-user" }), StatusCode::BAD_REQUEST),
    ];
    for (payload, expected) in cases {
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "payload {payload}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    // The existing credential survives the refused registration.
    login!(app, "clinic-a", "pass-a");
}

#[actix_web::test]
async fn test_create_user_requires_token() {
    let app = app!();
    let payload = json!({ "username": "assistant", "password": "pw" });

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let token = login!(app, "clinic-a", "pass-a");
    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(bearer(&token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/users")
        .insert_header(bearer(&token))
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let token = login!(app, "assistant", "pw");
    assert!(!token.is_empty());
}
