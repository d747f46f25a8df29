//! Web server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPPLIERDB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SUPPLIERDB_BASE_URL` - Public URL used to build form and reset links
//!
//! ## Optional
//! - `SUPPLIERDB_HOST` - Bind address (default: 127.0.0.1)
//! - `SUPPLIERDB_PORT` - Listen port (default: 3000)
//! - `SUPPLIERDB_STATIC_DIR` - Stylesheet directory (default: crates/web/static)
//! - `RESET_TOKEN_TTL_MINUTES` - Password reset link lifetime (default: 60)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` -
//!   Outgoing mail; when `SMTP_HOST` is unset reset links are only logged
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use supplierdb_core::Namespace;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Web application configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, always ending in `/`
    pub base_url: Url,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Lifetime of password reset tokens
    pub reset_token_ttl: chrono::Duration,
    /// Outgoing mail settings; `None` logs reset links instead of sending them
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// SMTP configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl WebConfig {
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

        let database_url = get_database_url("SUPPLIERDB_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("SUPPLIERDB_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("SUPPLIERDB_PORT", "3000")?;
        let base_url = parse_base_url(&get_required_env("SUPPLIERDB_BASE_URL")?)?;
        let static_dir = PathBuf::from(get_env_or_default(
            "SUPPLIERDB_STATIC_DIR",
            "crates/web/static",
        ));
        let ttl_minutes = parse_env_or_default::<u32>("RESET_TOKEN_TTL_MINUTES", "60")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            static_dir,
            reset_token_ttl: chrono::Duration::minutes(i64::from(ttl_minutes)),
            email: EmailConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Public URL of a tenant's supplier form.
    #[must_use]
    pub fn form_url(&self, namespace: &Namespace) -> String {
        self.base_url
            .join(namespace.as_str())
            .map_or_else(|_| format!("{}{namespace}", self.base_url), String::from)
    }

    /// Public URL of the password reset page for a token.
    #[must_use]
    pub fn reset_url(&self, token: &str) -> String {
        let mut url = self
            .base_url
            .join("auth/reset-password")
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut().append_pair("token", token);
        url.into()
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_env_or_default::<u16>("SMTP_PORT", "587")?,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("SMTP_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
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
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse the public base URL, normalizing it to end with `/` so that
/// relative joins append instead of replacing the last path segment.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar("SUPPLIERDB_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "SUPPLIERDB_BASE_URL".to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> WebConfig {
        WebConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: parse_base_url(base_url).unwrap(),
            static_dir: PathBuf::from("static"),
            reset_token_ttl: chrono::Duration::minutes(60),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("https://supplierdb.example/app").unwrap();
        assert_eq!(url.as_str(), "https://supplierdb.example/app/");
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        assert!(matches!(
            parse_base_url("ftp://supplierdb.example"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_form_url_appends_namespace() {
        let ns = Namespace::derive("Acme Co").unwrap();
        assert_eq!(
            config("https://supplierdb.example/app").form_url(&ns),
            "https://supplierdb.example/app/acme-co"
        );
    }

    #[test]
    fn test_reset_url_encodes_token() {
        let url = config("http://localhost:3000").reset_url("abc-_123");
        assert_eq!(url, "http://localhost:3000/auth/reset-password?token=abc-_123");
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let email = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("super_secret_smtp_password"),
            from_address: "noreply@example.com".to_string(),
        };

        let debug_output = format!("{email:?}");
        assert!(debug_output.contains("smtp.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_smtp_password"));
    }
}
