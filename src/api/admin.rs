//! Administration endpoints: accounts, order oversight and reporting

use crate::{
    api::{
        extract::{Json, Path},
        parse_id, ApiError, AppState,
    },
    auth::{models::UserResponse, UserRole},
    models::{Order, OrderStatus, OrderUpdate},
    store::UserUpdate,
};
use axum::extract::State;
use serde_json::{json, Map, Value};
use tracing::info;

const RECENT_ORDER_LIMIT: usize = 10;

/// GET /api/admin/manage-users
pub async fn manage_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state
        .users
        .list()
        .map_err(ApiError::store("Failed to manage users"))?;
    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// PATCH /api/admin/update-user/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&user_id)?;
    if matches!(&update.username, Some(name) if name.trim().is_empty()) {
        return Err(ApiError::Validation("Username cannot be empty".to_string()));
    }

    state
        .users
        .update(&id, &update)
        .map_err(ApiError::store("Failed to update user"))?;

    info!("👤 User {} updated", id);
    Ok(Json(json!({ "message": "User updated successfully" })))
}

/// DELETE /api/admin/deactivate-user/:user_id
///
/// Soft delete; repeating it is a no-op that still succeeds.
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&user_id)?;

    state
        .users
        .set_active(&id, false)
        .map_err(ApiError::store("Failed to deactivate user"))?;

    info!("🚫 User {} deactivated", id);
    Ok(Json(json!({ "message": "User deactivated" })))
}

/// GET /api/admin/view-orders
pub async fn view_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .orders
        .list()
        .map_err(ApiError::store("Failed to retrieve orders"))?;
    Ok(Json(orders))
}

/// PATCH /api/admin/manage-order/:order_id
pub async fn manage_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(update): Json<OrderUpdate>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&order_id)?;

    if let Some(courier_id) = update.delivery_id {
        let courier = state
            .users
            .find_by_id(&courier_id)
            .map_err(ApiError::store("Failed to manage order"))?;
        match courier {
            Some(user) if user.role == UserRole::Delivery && user.active => {}
            _ => {
                return Err(ApiError::Validation(
                    "Assignee must be an active delivery account".to_string(),
                ))
            }
        }
    }

    let order = state
        .orders
        .update(&id, &update)
        .map_err(ApiError::store("Failed to manage order"))?;

    info!("📋 Order {} managed: {}", order.id, order.status.as_str());
    Ok(Json(json!({
        "message": "Order updated successfully",
        "order": order,
    })))
}

/// GET /api/admin/generate-reports
pub async fn generate_reports(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state
        .users
        .list()
        .map_err(ApiError::store("Failed to generate reports"))?;
    let orders = state
        .orders
        .list()
        .map_err(ApiError::store("Failed to generate reports"))?;

    let mut users_by_role = Map::new();
    for role in UserRole::ALL {
        let count = users.iter().filter(|u| u.role == role).count();
        users_by_role.insert(role.as_str().to_string(), json!(count));
    }

    let mut orders_by_status = Map::new();
    for status in OrderStatus::ALL {
        let count = orders.iter().filter(|o| o.status == status).count();
        orders_by_status.insert(status.as_str().to_string(), json!(count));
    }

    let revenue: f64 = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Delivered)
        .map(|o| o.total)
        .sum();

    Ok(Json(json!({
        "total_users": users.len(),
        "users_by_role": users_by_role,
        "total_orders": orders.len(),
        "orders_by_status": orders_by_status,
        "delivered_revenue": revenue,
    })))
}

/// GET /api/admin/monitor-activity
pub async fn monitor_activity(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state
        .users
        .list()
        .map_err(ApiError::store("Failed to monitor activity"))?;
    let orders = state
        .orders
        .list()
        .map_err(ApiError::store("Failed to monitor activity"))?;

    let active = users.iter().filter(|u| u.active).count();
    let open = orders.iter().filter(|o| o.status.is_open()).count();
    let recent: Vec<&Order> = orders.iter().take(RECENT_ORDER_LIMIT).collect();

    Ok(Json(json!({
        "active_users": active,
        "inactive_users": users.len() - active,
        "open_orders": open,
        "recent_orders": recent,
    })))
}
