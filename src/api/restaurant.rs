//! Restaurant endpoints: menu management and incoming orders

use crate::{
    api::{
        extract::{Json, Path},
        update_owned_order_status, ApiError, AppState,
    },
    auth::AuthUser,
    models::{MenuItem, NewMenuItem, Order, OrderStatus},
};
use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct AddMenuItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

/// GET /api/restaurants/menu
pub async fn list_menu(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let items = state
        .menus
        .list_by_restaurant(&ctx.subject_id)
        .map_err(ApiError::store("Failed to retrieve menu"))?;
    Ok(Json(items))
}

/// POST /api/restaurants/menu
pub async fn add_menu_item(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Json(payload): Json<AddMenuItemRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Item name is required".to_string()));
    }
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(ApiError::Validation("Invalid price".to_string()));
    }

    let item = state
        .menus
        .add_item(NewMenuItem {
            restaurant_id: ctx.subject_id,
            name: name.to_string(),
            description: payload.description,
            price: payload.price,
        })
        .map_err(ApiError::store("Failed to add menu item"))?;

    info!("🍽️ Menu item added: {} ({:.2})", item.name, item.price);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Menu item added", "item": item })),
    ))
}

/// GET /api/restaurants/orders
pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .orders
        .list_by_restaurant(&ctx.subject_id)
        .map_err(ApiError::store("Failed to retrieve orders"))?;
    Ok(Json(orders))
}

/// PATCH /api/restaurants/update-order/:order_id
pub async fn update_order(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(order_id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let order = update_owned_order_status(
        &state,
        &order_id,
        payload.status,
        |order| order.restaurant_id == ctx.subject_id,
        "Failed to update order",
    )?;

    info!("📦 Order {} now {}", order.id, order.status.as_str());

    Ok(Json(json!({
        "message": "Order updated successfully",
        "order": order,
    })))
}
