//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MENUHUB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `MENUHUB_HOST` - Bind address (default: 127.0.0.1)
//! - `MENUHUB_PORT` - Listen port (default: 3000)
//! - `MENUHUB_BASE_URL` - Public URL used in links to menus (default: `http://localhost:3000`)
//! - `MENUHUB_CORS_ORIGINS` - Comma-separated origins allowed to call the API
//! - `MENUHUB_TIMEZONE` - IANA zone that defines "today" for dashboards (default: America/Sao_Paulo)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Origins allowed by CORS; empty means same-origin only
    pub cors_origins: Vec<String>,
    /// Time zone used for "today" in statistics
    pub timezone: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MENUHUB_DATABASE_URL")?;
        let host = get_env_or_default("MENUHUB_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MENUHUB_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("MENUHUB_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MENUHUB_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("MENUHUB_BASE_URL", "http://localhost:3000");
        let cors_origins = parse_origins(get_optional_env("MENUHUB_CORS_ORIGINS").as_deref())?;
        let timezone = parse_timezone(&get_env_or_default("MENUHUB_TIMEZONE", "America/Sao_Paulo"))?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origins,
            timezone,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Public URL of a store's menu.
    #[must_use]
    pub fn menu_url(&self, slug: &str) -> String {
        format!("{}/menu/{slug}", self.base_url.trim_end_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma-separated origin list, requiring an http(s) scheme on each.
fn parse_origins(raw: Option<&str>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin.starts_with("http://") || origin.starts_with("https://") {
                Ok(origin.trim_end_matches('/').to_owned())
            } else {
                Err(ConfigError::InvalidEnvVar(
                    "MENUHUB_CORS_ORIGINS".to_string(),
                    format!("origin must start with http:// or https://: {origin}"),
                ))
            }
        })
        .collect()
}

/// Accept `Area/City` style zone names and `UTC`.
fn parse_timezone(raw: &str) -> Result<String, ConfigError> {
    let tz = raw.trim();
    let valid = tz == "UTC"
        || (tz.contains('/')
            && tz
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '+')));
    if valid {
        Ok(tz.to_owned())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "MENUHUB_TIMEZONE".to_string(),
            format!("not an IANA time zone name: {tz}"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://menu.example.com/".to_string(),
            cors_origins: Vec::new(),
            timezone: "America/Sao_Paulo".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_menu_url_trims_trailing_slash() {
        assert_eq!(
            config().menu_url("pizzaria-centro"),
            "https://menu.example.com/menu/pizzaria-centro"
        );
    }

    #[test]
    fn test_parse_origins() {
        assert!(parse_origins(None).unwrap().is_empty());
        assert_eq!(
            parse_origins(Some("https://a.com/, http://localhost:5173 ,")).unwrap(),
            vec!["https://a.com", "http://localhost:5173"]
        );
        assert!(matches!(
            parse_origins(Some("a.com")),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("UTC").unwrap(), "UTC");
        assert_eq!(
            parse_timezone(" America/Sao_Paulo ").unwrap(),
            "America/Sao_Paulo"
        );
        assert!(parse_timezone("'; DROP TABLE orders; --").is_err());
        assert!(parse_timezone("Brasilia").is_err());
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let debug_output = format!("{:?}", config());
        assert!(!debug_output.contains("postgres://localhost/test"));
    }
}
