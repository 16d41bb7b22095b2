//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Which service this process runs.
///
/// One binary serves every role; the role decides which routes are mounted
/// and which downstream services must be reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    /// Transfer orchestrator (`transferAmount`, `getTransaction`, ...)
    Transaction,
    /// Ledger-backed account service
    Account,
    /// Notification recorder
    Notification,
    /// Customer balance totals and their history
    Balance,
    /// Central credential checker and capability token issuer
    Auth,
}

/// Process-wide authorization mode. Chosen once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthPattern {
    #[default]
    NoAuth,
    Centralized,
    Decentralized,
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVICE_ROLE` (required): `transaction`, `account`, `notification`, `balance` or `auth`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `AUTH_PATTERN` (optional): `NO_AUTH`, `CENTRALIZED` or `DECENTRALIZED`, defaults to `NO_AUTH`
/// - `ACCOUNT_SERVICE_URL`, `NOTIFICATION_SERVICE_URL`, `CUSTOMER_SERVICE_URL`,
///   `AUTH_SERVICE_URL`: base URLs of downstream services, required per role
/// - `CAPABILITY_SECRET` (optional): HMAC key for capability tokens
/// - `CAPABILITY_TTL_SECS` (optional): token lifetime, defaults to 300
/// - `DOWNSTREAM_TIMEOUT_MS` (optional): per-call deadline, defaults to 5000
/// - `READ_RETRIES` (optional): extra attempts for idempotent reads, defaults to 2
/// - `COMPENSATE_FAILED_CREDIT` (optional): refund the sender when the credit step fails, defaults to false
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    pub service_role: ServiceRole,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default)]
    pub auth_pattern: AuthPattern,

    pub account_service_url: Option<String>,
    pub notification_service_url: Option<String>,
    pub customer_service_url: Option<String>,
    pub auth_service_url: Option<String>,

    pub capability_secret: Option<String>,

    #[serde(default = "default_capability_ttl")]
    pub capability_ttl_secs: u64,

    #[serde(default = "default_timeout_ms")]
    pub downstream_timeout_ms: u64,

    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    #[serde(default)]
    pub compensate_failed_credit: bool,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("{0} must be set for this service role")]
    Missing(&'static str),

    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        source: url::ParseError,
    },
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_capability_ttl() -> u64 {
    300
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_read_retries() -> u32 {
    2
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every downstream URL the selected role and auth pattern
    /// depend on is present and parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.service_role {
            ServiceRole::Transaction => {
                self.account_service()?;
                self.notification_service()?;
            }
            ServiceRole::Notification => {
                self.account_service()?;
                self.customer_service()?;
            }
            ServiceRole::Balance => {
                self.account_service()?;
            }
            ServiceRole::Account | ServiceRole::Auth => {}
        }

        if self.auth_pattern == AuthPattern::Centralized && self.service_role != ServiceRole::Auth {
            self.auth_service()?;
        }

        Ok(())
    }

    pub fn account_service(&self) -> Result<Url, ConfigError> {
        required_url("ACCOUNT_SERVICE_URL", self.account_service_url.as_deref())
    }

    pub fn notification_service(&self) -> Result<Url, ConfigError> {
        required_url(
            "NOTIFICATION_SERVICE_URL",
            self.notification_service_url.as_deref(),
        )
    }

    pub fn customer_service(&self) -> Result<Url, ConfigError> {
        required_url("CUSTOMER_SERVICE_URL", self.customer_service_url.as_deref())
    }

    pub fn auth_service(&self) -> Result<Url, ConfigError> {
        required_url("AUTH_SERVICE_URL", self.auth_service_url.as_deref())
    }

    pub fn downstream_timeout(&self) -> Duration {
        Duration::from_millis(self.downstream_timeout_ms)
    }

    pub fn capability_ttl(&self) -> Duration {
        Duration::from_secs(self.capability_ttl_secs)
    }
}

fn required_url(name: &'static str, value: Option<&str>) -> Result<Url, ConfigError> {
    let raw = value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))?;
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })
}
