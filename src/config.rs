//! Process configuration, read once from the environment at startup.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::secret::Secret;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials of the Google OAuth client registered for this deployment.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: Secret<String>,
    pub google: GoogleConfig,
    /// Where the browser lands after a successful Google sign-in.
    pub frontend_url: String,
    pub cookie_secure: bool,
    /// Deadline applied to every individual store call.
    pub store_timeout: Duration,
    /// Deadline applied to every request made to the identity provider.
    pub provider_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: parsed("SERVER_PORT", 8080)?,
            server_host: optional("SERVER_HOST", "127.0.0.1"),
            environment: optional("ENVIRONMENT", "development"),
            log_level: optional("LOG_LEVEL", "info"),
            jwt_secret: Secret::new(required("JWT_SECRET")?),
            google: GoogleConfig {
                client_id: required("GOOGLE_CLIENT_ID")?,
                client_secret: Secret::new(required("GOOGLE_CLIENT_SECRET")?),
                redirect_uri: required("GOOGLE_REDIRECT_URI")?,
            },
            frontend_url: optional("FRONTEND_URL", "http://localhost:5173/"),
            cookie_secure: parsed("COOKIE_SECURE", true)?,
            store_timeout: Duration::from_secs(parsed("STORE_TIMEOUT_SECS", 5)?),
            provider_timeout: Duration::from_secs(parsed("PROVIDER_TIMEOUT_SECS", 10)?),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    /// Origin of `frontend_url`, used as the allowed CORS origin.
    pub fn frontend_origin(&self) -> String {
        match reqwest::Url::parse(&self.frontend_url) {
            Ok(url) => url.origin().ascii_serialization(),
            Err(_) => self.frontend_url.trim_end_matches('/').to_string(),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}
