//! Delivery endpoints: a courier's assigned orders

use crate::{
    api::{
        extract::{Json, Path},
        restaurant::StatusUpdateRequest,
        update_owned_order_status, ApiError, AppState,
    },
    auth::AuthUser,
    models::Order,
};
use axum::extract::State;
use serde_json::{json, Value};
use tracing::info;

/// GET /api/delivery/assigned-orders
pub async fn assigned_orders(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .orders
        .list_by_delivery(&ctx.subject_id)
        .map_err(ApiError::store("Failed to retrieve assigned orders"))?;
    Ok(Json(orders))
}

/// PATCH /api/delivery/update-status/:order_id
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(order_id): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let order = update_owned_order_status(
        &state,
        &order_id,
        payload.status,
        |order| order.delivery_id == Some(ctx.subject_id),
        "Failed to update delivery status",
    )?;

    info!("🚚 Order {} now {}", order.id, order.status.as_str());

    Ok(Json(json!({
        "message": "Delivery status updated",
        "order": order,
    })))
}
