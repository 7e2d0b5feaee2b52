//! Food Delivery API server
//! Mission: Role-gated ordering for customers, restaurants, couriers and admins

use anyhow::{Context, Result};
use dotenv::dotenv;
use food_delivery_api::{
    api::{self, AppState},
    auth::JwtHandler,
    config::AppConfig,
    store::SqliteStore,
};
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("🚀 Food Delivery API starting");

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let db_path = config.database_path.to_string_lossy().to_string();
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path))?;
    info!("💾 Store initialized at: {}", db_path);

    let jwt = JwtHandler::new(&config.jwt_secret);
    if config.enforce_active_accounts {
        info!("🔐 Active-account check enabled on every request");
    } else {
        warn!("⚠️ Deactivated accounts keep access until their token expires");
    }

    let state = AppState::new(store, jwt).with_active_account_check(config.enforce_active_accounts);
    let app = api::router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "food_delivery_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // Also try the crate directory when started from elsewhere
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}
