//! End-to-end flow through the public router: register, login, then the gated routes.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use food_delivery_api::{
    api::{router, AppState},
    auth::{JwtHandler, UserRole},
    store::SqliteStore,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "integration-secret";

fn state() -> AppState {
    AppState::new(SqliteStore::in_memory().unwrap(), JwtHandler::new(SECRET))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_and_login(app: &Router, username: &str, role: &str) -> (String, String) {
    let (status, body) = call(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": username, "password": "password123", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {}", username);
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {}", username);
    (id, body["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_order_flows_from_customer_to_courier() {
    let app = router(state());

    let (restaurant_id, restaurant) = register_and_login(&app, "pizzeria", "restaurant").await;
    let (courier_id, courier) = register_and_login(&app, "rider", "delivery").await;
    let (_, customer) = register_and_login(&app, "hungry", "customer").await;
    let (_, admin) = register_and_login(&app, "boss", "admin").await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/restaurants/menu",
        Some(&restaurant),
        Some(json!({ "name": "Margherita", "description": "Classic", "price": 9.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, found) = call(
        &app,
        "GET",
        "/api/customers/search-menus?q=marg",
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(found[0]["name"], "Margherita");

    let (status, placed) = call(
        &app,
        "POST",
        "/api/customers/place-order",
        Some(&customer),
        Some(json!({
            "restaurant_id": restaurant_id,
            "items": [{ "name": "Margherita", "quantity": 2, "unit_price": 9.5 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = placed["order"]["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/restaurants/update-order/{}", order_id),
        Some(&restaurant),
        Some(json!({ "status": "ready_for_pickup" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/admin/manage-order/{}", order_id),
        Some(&admin),
        Some(json!({ "delivery_id": courier_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/api/delivery/update-status/{}", order_id),
        Some(&courier),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, tracked) = call(
        &app,
        "GET",
        &format!("/api/customers/track-order/{}", order_id),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(tracked["status"], "delivered");

    let (_, report) = call(&app, "GET", "/api/admin/generate-reports", Some(&admin), None).await;
    assert_eq!(report["delivered_revenue"], 19.0);
}

#[tokio::test]
async fn test_gates_reject_before_handlers() {
    let app = router(state());
    let (_, customer) = register_and_login(&app, "someone", "customer").await;

    let (status, body) = call(&app, "GET", "/api/admin/view-orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = call(
        &app,
        "GET",
        "/api/admin/view-orders",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, "GET", "/api/admin/view-orders", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "message": "Access denied" }));

    let (status, _) = call(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = router(state());
    let jwt = JwtHandler::new(SECRET);
    let stale = jwt
        .issue_at(&Uuid::new_v4(), UserRole::Admin, Utc::now() - Duration::hours(2))
        .unwrap();

    let (status, _) = call(&app, "GET", "/api/admin/manage-users", Some(&stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deactivation_revokes_access_when_enforced() {
    let app = router(state().with_active_account_check(true));
    let (customer_id, customer) = register_and_login(&app, "short-lived", "customer").await;
    let (_, admin) = register_and_login(&app, "admin", "admin").await;

    let (status, _) = call(&app, "GET", "/api/customers/order-history", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/api/admin/deactivate-user/{}", customer_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, "GET", "/api/customers/order-history", Some(&customer), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
