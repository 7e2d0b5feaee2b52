//! Customer endpoints: restaurant discovery and the customer's own orders

use crate::{
    api::{
        extract::{Json, Path, Query},
        parse_id, ApiError, AppState,
    },
    auth::{models::UserResponse, AuthUser, UserRole},
    models::{MenuItem, NewOrder, Order, OrderItem},
};
use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct MenuSearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub restaurant_id: Uuid,
    pub items: Vec<OrderItem>,
}

/// GET /api/customers/browse-restaurants
pub async fn browse_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let restaurants = state
        .users
        .list_by_role(UserRole::Restaurant)
        .map_err(ApiError::store("Failed to browse restaurants"))?;

    Ok(Json(
        restaurants
            .iter()
            .filter(|user| user.active)
            .map(UserResponse::from_user)
            .collect(),
    ))
}

/// GET /api/customers/search-menus?q=
pub async fn search_menus(
    State(state): State<AppState>,
    Query(query): Query<MenuSearchQuery>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let items = state
        .menus
        .search(query.q.trim())
        .map_err(ApiError::store("Failed to search menus"))?;
    Ok(Json(items))
}

fn validate_items(items: &[OrderItem]) -> Result<(), ApiError> {
    if items.is_empty() {
        return Err(ApiError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }
    for item in items {
        if item.name.trim().is_empty() || item.quantity == 0 {
            return Err(ApiError::Validation(format!(
                "Invalid order item: {}",
                item.name
            )));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(ApiError::Validation(format!(
                "Invalid price for item: {}",
                item.name
            )));
        }
    }
    Ok(())
}

/// POST /api/customers/place-order
pub async fn place_order(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_items(&payload.items)?;

    let restaurant = state
        .users
        .find_by_id(&payload.restaurant_id)
        .map_err(ApiError::store("Failed to place order"))?
        .filter(|user| user.role == UserRole::Restaurant && user.active)
        .ok_or(ApiError::NotFound("Restaurant"))?;

    let order = state
        .orders
        .create(NewOrder {
            customer_id: ctx.subject_id,
            restaurant_id: restaurant.id,
            items: payload.items,
        })
        .map_err(ApiError::store("Failed to place order"))?;

    info!(
        "🛒 Order {} placed with {} (total {:.2})",
        order.id, restaurant.username, order.total
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully",
            "order": order,
        })),
    ))
}

/// GET /api/customers/track-order/:order_id
pub async fn track_order(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let id = parse_id(&order_id)?;

    state
        .orders
        .find_by_id(&id)
        .map_err(ApiError::store("Failed to track order"))?
        .filter(|order| order.customer_id == ctx.subject_id)
        .map(Json)
        .ok_or(ApiError::NotFound("Order"))
}

/// GET /api/customers/order-history
pub async fn order_history(
    State(state): State<AppState>,
    AuthUser(ctx): AuthUser,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .orders
        .list_by_customer(&ctx.subject_id)
        .map_err(ApiError::store("Failed to retrieve order history"))?;
    Ok(Json(orders))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::{router, test_support::*, AppState},
        auth::UserRole,
        models::NewMenuItem,
        store::NewUser,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn seed_restaurant(state: &AppState, name: &str) -> Uuid {
        state
            .users
            .create(NewUser {
                username: name.to_string(),
                password_hash: "unused".to_string(),
                role: UserRole::Restaurant,
            })
            .unwrap()
            .id
    }

    fn order_body(restaurant_id: Uuid) -> serde_json::Value {
        json!({
            "restaurant_id": restaurant_id,
            "items": [
                { "name": "Pad Thai", "quantity": 2, "unit_price": 11.0 },
                { "name": "Spring Rolls", "quantity": 1, "unit_price": 4.5 }
            ]
        })
    }

    #[tokio::test]
    async fn test_browse_lists_only_active_restaurants() {
        let state = test_state();
        seed_restaurant(&state, "open-kitchen");
        let closed = seed_restaurant(&state, "closed-kitchen");
        state.users.set_active(&closed, false).unwrap();
        state
            .users
            .create(NewUser {
                username: "hungry".to_string(),
                password_hash: "unused".to_string(),
                role: UserRole::Customer,
            })
            .unwrap();
        let (_, auth) = bearer(&state, UserRole::Customer);

        let response = router(state)
            .oneshot(json_request(
                "GET",
                "/api/customers/browse-restaurants",
                Some(&auth),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let names: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["username"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["open-kitchen".to_string()]);
    }

    #[tokio::test]
    async fn test_search_menus_matches_name() {
        let state = test_state();
        let restaurant = seed_restaurant(&state, "noodle-bar");
        for name in ["Beef Noodles", "Green Curry"] {
            state
                .menus
                .add_item(NewMenuItem {
                    restaurant_id: restaurant,
                    name: name.to_string(),
                    description: String::new(),
                    price: 10.0,
                })
                .unwrap();
        }
        let (_, auth) = bearer(&state, UserRole::Customer);

        let response = router(state)
            .oneshot(json_request(
                "GET",
                "/api/customers/search-menus?q=noodle",
                Some(&auth),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Beef Noodles");
    }

    #[tokio::test]
    async fn test_place_and_track_order() {
        let state = test_state();
        let restaurant = seed_restaurant(&state, "thai-house");
        let (customer_id, auth) = bearer(&state, UserRole::Customer);
        let app = router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/customers/place-order",
                Some(&auth),
                Some(order_body(restaurant)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Order placed successfully");
        assert_eq!(body["order"]["status"], "pending");
        assert_eq!(body["order"]["total"], 26.5);
        assert_eq!(body["order"]["customer_id"], customer_id.to_string());

        let order_id = body["order"]["id"].as_str().unwrap().to_string();
        let response = app
            .clone()
            .oneshot(json_request(
                "GET",
                &format!("/api/customers/track-order/{}", order_id),
                Some(&auth),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], order_id);

        let response = app
            .oneshot(json_request(
                "GET",
                "/api/customers/order-history",
                Some(&auth),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_track_order_of_another_customer_is_not_found() {
        let state = test_state();
        let restaurant = seed_restaurant(&state, "grill");
        let (_, owner) = bearer(&state, UserRole::Customer);
        let (_, stranger) = bearer(&state, UserRole::Customer);
        let app = router(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/customers/place-order",
                Some(&owner),
                Some(order_body(restaurant)),
            ))
            .await
            .unwrap();
        let order_id = body_json(response).await["order"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(json_request(
                "GET",
                &format!("/api/customers/track-order/{}", order_id),
                Some(&stranger),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Order not found" })
        );
    }

    #[tokio::test]
    async fn test_place_order_validation() {
        let state = test_state();
        let restaurant = seed_restaurant(&state, "diner");
        let (_, auth) = bearer(&state, UserRole::Customer);
        let app = router(state);

        for body in [
            json!({ "restaurant_id": restaurant, "items": [] }),
            json!({
                "restaurant_id": restaurant,
                "items": [{ "name": "Soup", "quantity": 0, "unit_price": 5.0 }]
            }),
            json!({
                "restaurant_id": restaurant,
                "items": [{ "name": "Soup", "quantity": 1, "unit_price": -5.0 }]
            }),
        ] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "POST",
                    "/api/customers/place-order",
                    Some(&auth),
                    Some(body),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/customers/place-order",
                Some(&auth),
                Some(order_body(Uuid::new_v4())),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Restaurant not found" })
        );
    }

    #[tokio::test]
    async fn test_track_order_rejects_malformed_id() {
        let state = test_state();
        let (_, auth) = bearer(&state, UserRole::Customer);

        let response = router(state)
            .oneshot(json_request(
                "GET",
                "/api/customers/track-order/not-a-uuid",
                Some(&auth),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "message": "Invalid ID format" })
        );
    }
}
