//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::{
    api::AppState,
    auth::{jwt::TokenError, models::AuthContext},
};
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

/// Auth middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let token = header_value
        .to_str()
        .ok()
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MalformedToken)?;

    let claims = state.jwt.verify(token).map_err(|e| {
        warn!("🔒 Rejected token on {}: {}", req.uri().path(), e);
        AuthError::from(e)
    })?;

    let subject_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::MalformedToken)?;

    if state.enforce_active_accounts {
        let active = state
            .users
            .find_by_id(&subject_id)
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
            .map(|user| user.active)
            .unwrap_or(false);

        if !active {
            warn!("🔒 Token for inactive account {} refused", subject_id);
            return Err(AuthError::InactiveAccount);
        }
    }

    let ctx = AuthContext {
        subject_id,
        role: claims.role,
    };

    // Gates and handlers read the request copy; the response copy is for request logging
    req.extensions_mut().insert(ctx.clone());
    let mut response = next.run(req).await;
    response.extensions_mut().insert(ctx);

    Ok(response)
}

/// Extract the auth context from a request (use after auth middleware)
pub fn extract_context(req: &Request) -> Option<&AuthContext> {
    req.extensions().get::<AuthContext>()
}

/// Handler extractor for the verified caller.
pub struct AuthUser(pub AuthContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(AuthUser)
            .ok_or(AuthError::MissingToken)
    }
}

/// Auth error types
#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    MalformedToken,
    InactiveAccount,
    Unavailable(String),
}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Malformed => AuthError::MalformedToken,
            TokenError::Invalid | TokenError::Signing(_) => AuthError::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Missing authorization token" }),
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Invalid token" }),
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Token expired" }),
            ),
            AuthError::MalformedToken => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Malformed authorization token. Use: Bearer {token}" }),
            ),
            AuthError::InactiveAccount => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Account is inactive" }),
            ),
            AuthError::Unavailable(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Authentication failed", "error": error }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
