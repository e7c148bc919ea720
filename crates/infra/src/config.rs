//! Configuration loading and representation.
//!
//! Everything comes from `ORGDESK_*` environment variables. Missing values fall
//! back to development defaults; a missing database host means "no database",
//! and the application runs on the in-memory store.

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_PORT: u16 = 5432;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Listen address (`ORGDESK_HTTP`).
    pub http_addr: String,
    pub db_host: Option<String>,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_pass: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            db_host: None,
            db_port: DEFAULT_DB_PORT,
            db_name: String::new(),
            db_user: String::new(),
            db_pass: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map lookup).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_port = match get("ORGDESK_DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "ORGDESK_DB_PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_DB_PORT,
        };

        Ok(Self {
            http_addr: get("ORGDESK_HTTP").unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
            db_host: get("ORGDESK_DB_HOST"),
            db_port,
            db_name: get("ORGDESK_DB_NAME").unwrap_or_default(),
            db_user: get("ORGDESK_DB_USER").unwrap_or_default(),
            db_pass: get("ORGDESK_DB_PASS").unwrap_or_default(),
        })
    }

    /// Connection options for `PgPool`, or `None` without a database host.
    pub fn pg_connect_options(&self) -> Option<PgConnectOptions> {
        let host = self.db_host.as_deref()?;
        Some(
            PgConnectOptions::new()
                .host(host)
                .port(self.db_port)
                .database(&self.db_name)
                .username(&self.db_user)
                .password(&self.db_pass)
                .ssl_mode(PgSslMode::Disable),
        )
    }
}
