//! Role Gate
//! Mission: Least-privilege access per route

use crate::auth::{
    middleware::AuthError,
    models::{AuthContext, UserRole},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

/// Roles a route accepts, declared once when the route is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(pub &'static [UserRole]);

impl RoleSet {
    pub const CUSTOMER: RoleSet = RoleSet(&[UserRole::Customer]);
    pub const RESTAURANT: RoleSet = RoleSet(&[UserRole::Restaurant]);
    pub const DELIVERY: RoleSet = RoleSet(&[UserRole::Delivery]);
    pub const ADMIN: RoleSet = RoleSet(&[UserRole::Admin]);
    pub const ANY: RoleSet = RoleSet(&UserRole::ALL);

    pub fn allows(&self, role: UserRole) -> bool {
        allow(role, self.0)
    }
}

pub fn allow(role: UserRole, required: &[UserRole]) -> bool {
    required.contains(&role)
}

/// Middleware rejecting callers whose role is outside the route's set.
/// Must sit inside [`auth_middleware`](crate::auth::auth_middleware).
pub async fn role_gate(
    State(required): State<RoleSet>,
    req: Request,
    next: Next,
) -> Result<Response, Response> {
    let ctx = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| AuthError::MissingToken.into_response())?;

    if !required.allows(ctx.role) {
        warn!(
            "⛔ {} ({}) denied on {}",
            ctx.subject_id,
            ctx.role.as_str(),
            req.uri().path()
        );
        return Err(AuthorizationError.into_response());
    }

    Ok(next.run(req).await)
}

/// Authenticated caller lacks the required role.
#[derive(Debug)]
pub struct AuthorizationError;

impl IntoResponse for AuthorizationError {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "Access denied" })),
        )
            .into_response()
    }
}
