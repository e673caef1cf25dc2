//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use sellerdesk_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// PostgreSQL connection string; in-memory stores when absent.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Clock skew tolerated when checking token `iat`/`exp`.
    pub token_leeway: Duration,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            database_url: None,
            database_max_connections: 10,
            token_leeway: Duration::zero(),
            log_format: LogFormat::Json,
        }
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("database_max_connections", &self.database_max_connections)
            .field("token_leeway", &self.token_leeway)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Read `SELLERDESK_BIND_ADDR`, `JWT_SECRET`, `DATABASE_URL`,
    /// `SELLERDESK_DB_MAX_CONNECTIONS`, `SELLERDESK_TOKEN_LEEWAY_SECS` and
    /// `SELLERDESK_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_raw = lookup("SELLERDESK_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "SELLERDESK_BIND_ADDR",
            message: format!("{bind_raw}: {e}"),
        })?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());

        let database_max_connections = match lookup("SELLERDESK_DB_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                var: "SELLERDESK_DB_MAX_CONNECTIONS",
                message: format!("{raw}: {e}"),
            })?,
            None => defaults.database_max_connections,
        };

        let token_leeway = match lookup("SELLERDESK_TOKEN_LEEWAY_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                    var: "SELLERDESK_TOKEN_LEEWAY_SECS",
                    message: format!("{raw}: {e}"),
                })?;
                Duration::seconds(i64::from(secs))
            }
            None => defaults.token_leeway,
        };

        let log_format = match lookup("SELLERDESK_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                var: "SELLERDESK_LOG_FORMAT",
                message: e.to_string(),
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url,
            database_max_connections,
            token_leeway,
            log_format,
        })
    }

    /// Warn about settings that are only fit for development. Call once
    /// logging is up.
    pub fn warn_insecure_defaults(&self) {
        if self.jwt_secret == DEV_JWT_SECRET {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SELLERDESK_BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/sellerdesk"),
            ("SELLERDESK_DB_MAX_CONNECTIONS", "4"),
            ("SELLERDESK_TOKEN_LEEWAY_SECS", "30"),
            ("SELLERDESK_LOG_FORMAT", "pretty"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/sellerdesk"));
        assert_eq!(config.database_max_connections, 4);
        assert_eq!(config.token_leeway, Duration::seconds(30));
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = AppConfig::from_lookup(lookup(&[("SELLERDESK_BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SELLERDESK_BIND_ADDR", .. }));

        let err = AppConfig::from_lookup(lookup(&[("SELLERDESK_TOKEN_LEEWAY_SECS", "-1")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SELLERDESK_TOKEN_LEEWAY_SECS", .. }));
    }

    #[test]
    fn unknown_log_format_fails_instead_of_falling_back() {
        let err = AppConfig::from_lookup(lookup(&[("SELLERDESK_LOG_FORMAT", "xml")])).unwrap_err();
        let ConfigError::Invalid { var, message } = err;
        assert_eq!(var, "SELLERDESK_LOG_FORMAT");
        assert!(message.contains("xml"));
    }

    #[test]
    fn debug_hides_secrets() {
        let config = AppConfig {
            jwt_secret: "hunter2".to_string(),
            database_url: Some("postgres://user:pw@db/x".to_string()),
            ..AppConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("pw@db"));
    }
}
