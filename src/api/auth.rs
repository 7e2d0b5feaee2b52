//! Authentication API Endpoints
//! Mission: Registration, login and caller introspection

use crate::{
    api::{extract::Json, ApiError, AppState},
    auth::{
        models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserResponse},
        password, AuthUser,
    },
    store::NewUser,
};
use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let password_hash = password::hash_blocking(payload.password)
        .await
        .map_err(ApiError::failed("Registration failed"))?;

    let user = state
        .users
        .create(NewUser {
            username: username.to_string(),
            password_hash,
            role: payload.role,
        })
        .map_err(ApiError::store("Registration failed"))?;

    info!(
        "✅ Registered user: {} ({})",
        user.username,
        user.role.as_str()
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!("🔐 Login attempt: {}", payload.username);

    let user = state
        .users
        .find_by_username(&payload.username)
        .map_err(ApiError::store("Login failed"))?;

    let Some(user) = user else {
        password::verify_dummy(payload.password)
            .await
            .map_err(ApiError::failed("Login failed"))?;
        warn!("❌ Failed login attempt: {}", payload.username);
        return Err(ApiError::InvalidCredentials);
    };

    let valid = password::verify_blocking(payload.password, user.password_hash.clone())
        .await
        .map_err(ApiError::failed("Login failed"))?;

    if !valid || !user.active {
        warn!("❌ Failed login attempt: {}", payload.username);
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .jwt
        .issue(&user.id, user.role)
        .map_err(ApiError::failed("Login failed"))?;

    info!(
        "✅ Login successful: {} ({})",
        user.username,
        user.role.as_str()
    );

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// Current caller - GET /api/auth/me
/// Answered from the verified token alone
pub async fn me(AuthUser(ctx): AuthUser) -> Json<Value> {
    Json(json!({
        "id": ctx.subject_id,
        "role": ctx.role,
    }))
}
