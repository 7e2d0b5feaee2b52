//! Process configuration, read once from the environment at startup.

use std::{
    env,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DB_FILE: &str = "food_delivery.db";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    /// Re-check the account's active flag on every authenticated request.
    pub enforce_active_accounts: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let host_raw = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: host_raw.clone(),
        })?;

        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let database_path = resolve_data_path(lookup("DATABASE_PATH"), DEFAULT_DB_FILE);

        let enforce_active_accounts = lookup("ENFORCE_ACTIVE_ACCOUNTS")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
            .unwrap_or(false);

        Ok(Self {
            jwt_secret,
            bind_addr: SocketAddr::new(host, port),
            database_path,
            enforce_active_accounts,
        })
    }
}

/// Relative paths resolve against the crate directory, not the caller's cwd.
fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> PathBuf {
    let base = Path::new(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename);
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p;
    }
    base.join(p)
}
