//! Service configuration, loaded from environment variables.

use std::net::SocketAddr;

use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Dashboard service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// HS256 secret used to verify session tokens
    pub jwt_secret: String,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Where unauthenticated requests are sent
    pub login_path: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid WEMAKIT_BIND_ADDR '{value}': {reason}")]
    InvalidBindAddr { value: String, reason: String },

    #[error("WEMAKIT_LOGIN_PATH must start with '/' (got '{0}')")]
    InvalidLoginPath(String),
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup("WEMAKIT_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let bind_addr = raw_addr.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddr {
            value: raw_addr.clone(),
            reason: e.to_string(),
        })?;

        let jwt_secret = lookup("WEMAKIT_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let log_filter = lookup("WEMAKIT_LOG").unwrap_or_else(|| "info".to_string());

        let login_path = lookup("WEMAKIT_LOGIN_PATH").unwrap_or_else(|| wemakit_auth::LOGIN_PATH.to_string());
        if !login_path.starts_with('/') {
            return Err(ConfigError::InvalidLoginPath(login_path));
        }

        Ok(Self {
            bind_addr,
            jwt_secret,
            log_filter,
            login_path,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert!(config.uses_dev_secret());
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.login_path, "/login");
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("WEMAKIT_BIND_ADDR", "0.0.0.0:9000"),
            ("WEMAKIT_JWT_SECRET", "s3cret"),
            ("WEMAKIT_LOG", "wemakit_auth=debug"),
            ("WEMAKIT_LOGIN_PATH", "/auth/sign-in"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.log_filter, "wemakit_auth=debug");
        assert_eq!(config.login_path, "/auth/sign-in");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = Config::from_lookup(lookup_from(&[("WEMAKIT_BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { value, .. } if value == "localhost"));

        let err = Config::from_lookup(lookup_from(&[("WEMAKIT_LOGIN_PATH", "login")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLoginPath("login".to_string()));
    }
}
