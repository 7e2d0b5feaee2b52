//! Request logging middleware.
//!
//! One event per request with the caller resolved by the authentication gate,
//! so rejected and accepted traffic can be traced back to an account.

use crate::auth::AuthContext;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// `subject/role` for authenticated requests, `anonymous` otherwise.
fn caller_label(ctx: Option<&AuthContext>) -> String {
    match ctx {
        Some(ctx) => format!("{}/{}", ctx.subject_id, ctx.role.as_str()),
        None => "anonymous".to_string(),
    }
}

fn outcome(status: u16) -> &'static str {
    match status {
        401 => "unauthenticated",
        403 => "forbidden",
        400..=499 => "rejected",
        500..=599 => "failed",
        _ => "completed",
    }
}

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    // Liveness probes hit "/" constantly
    if request.uri().path() == "/" {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();
    let caller = caller_label(response.extensions().get::<AuthContext>());

    if status >= 500 {
        warn!(%method, %path, status, %caller, latency_ms, "Request {}", outcome(status));
    } else {
        info!(%method, %path, status, %caller, latency_ms, "Request {}", outcome(status));
    }

    response
}
