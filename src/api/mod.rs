//! HTTP surface: shared state, error mapping and router assembly.

pub mod admin;
pub mod auth;
pub mod customer;
pub mod delivery;
pub mod extract;
pub mod restaurant;
pub mod routes;

use crate::{
    auth::{auth_middleware, role_gate, JwtHandler},
    middleware::request_logging,
    models::{Order, OrderStatus, OrderUpdate},
    store::{MenuRepository, OrderRepository, SqliteStore, StoreError, UserRepository},
};
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{fmt::Display, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;
use uuid::Uuid;

/// Application state shared by every handler and gate
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub menus: Arc<dyn MenuRepository>,
    pub jwt: Arc<JwtHandler>,
    pub enforce_active_accounts: bool,
}

impl AppState {
    pub fn new(store: SqliteStore, jwt: JwtHandler) -> Self {
        Self {
            users: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            menus: Arc::new(store),
            jwt: Arc::new(jwt),
            enforce_active_accounts: false,
        }
    }

    pub fn with_active_account_check(mut self, enabled: bool) -> Self {
        self.enforce_active_accounts = enabled;
        self
    }
}

/// Build the full application router.
///
/// Public routes skip both gates. Every entry of the route table runs the
/// authentication gate first and then its own role gate.
pub fn router(state: AppState) -> Router {
    let gated = routes::gated_routes()
        .into_iter()
        .fold(Router::new(), |router, route| {
            router.route(
                route.path,
                route
                    .handler
                    .route_layer(middleware::from_fn_with_state(route.roles, role_gate)),
            )
        })
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(health_check))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .merge(gated)
        .layer(middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "Food Delivery API is running"
}

/// Handler-level failures, rendered as `{message[, error]}` JSON bodies.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    InvalidCredentials,
    NotFound(&'static str),
    Failed { message: &'static str, error: String },
}

impl ApiError {
    /// Map a store failure for the operation described by `message`.
    pub fn store(message: &'static str) -> impl Fn(StoreError) -> ApiError {
        move |e| match e {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Failed {
                message,
                error: other.to_string(),
            },
        }
    }

    /// Map any other failure (hashing, signing) with its message surfaced verbatim.
    pub fn failed<E: Display>(message: &'static str) -> impl Fn(E) -> ApiError {
        move |e| ApiError::Failed {
            message,
            error: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid credentials" })),
            )
                .into_response(),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": format!("{} not found", what) })),
            )
                .into_response(),
            ApiError::Failed { message, error } => {
                error!("❌ {}: {}", message, error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": message, "error": error })),
                )
                    .into_response()
            }
        }
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid ID format".to_string()))
}

/// Set the status of an order the caller is responsible for.
///
/// Orders the caller does not own are reported as missing.
pub(crate) fn update_owned_order_status(
    state: &AppState,
    order_id: &str,
    status: OrderStatus,
    owns: impl Fn(&Order) -> bool,
    failure: &'static str,
) -> Result<Order, ApiError> {
    let id = parse_id(order_id)?;

    let order = state
        .orders
        .find_by_id(&id)
        .map_err(ApiError::store(failure))?
        .filter(|order| owns(order))
        .ok_or(ApiError::NotFound("Order"))?;

    state
        .orders
        .update(
            &order.id,
            &OrderUpdate {
                status: Some(status),
                delivery_id: None,
            },
        )
        .map_err(ApiError::store(failure))
}
