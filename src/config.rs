// Application configuration
// Loaded once at startup from the environment and shared read-only afterwards

use std::time::Duration;

/// Errors raised while reading the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Immutable application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    /// Symmetric secret used to sign session tokens
    pub jwt_secret: String,
    /// Lifetime of a session token (and of its cookie)
    pub token_ttl: Duration,
    /// How long a freshly issued invite stays redeemable
    pub invite_ttl: Duration,
    /// Adds the `Secure` attribute to the session cookie
    pub cookie_secure: bool,
    pub request_timeout: Duration,
    pub shutdown_grace: Duration,
}

impl AppConfig {
    pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);
    pub const DEFAULT_INVITE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    /// Build the configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = env_or("PORT", "8080");
        let port = port
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid { key: "PORT", value: port })?;

        let cookie_secure = env_or("COOKIE_SECURE", "false");
        let cookie_secure = match cookie_secure.to_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "COOKIE_SECURE",
                    value: cookie_secure,
                })
            }
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            host: env_or("HOST", "0.0.0.0"),
            port,
            jwt_secret,
            token_ttl: duration_var("JWT_EXPIRY", "24h")?,
            invite_ttl: duration_var("INVITE_EXPIRY", "7d")?,
            cookie_secure,
            request_timeout: duration_var("REQUEST_TIMEOUT", "15s")?,
            shutdown_grace: duration_var("SHUTDOWN_GRACE", "10s")?,
        })
    }

    /// Configuration with defaults for everything except the signing secret
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: jwt_secret.into(),
            token_ttl: Self::DEFAULT_TOKEN_TTL,
            invite_ttl: Self::DEFAULT_INVITE_TTL,
            cookie_secure: false,
            request_timeout: Duration::from_secs(15),
            shutdown_grace: Duration::from_secs(10),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn duration_var(key: &'static str, default: &str) -> Result<Duration, ConfigError> {
    let raw = env_or(key, default);
    parse_duration(&raw).ok_or(ConfigError::Invalid { key, value: raw })
}

/// Parse `90`, `90s`, `15m`, `24h` or `7d` into a non-zero duration
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(split) => raw.split_at(split),
        None => (raw, "s"),
    };

    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };

    match value.checked_mul(multiplier)? {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}
