use std::net::SocketAddr;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://app.db";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";
/// Ten years.
pub const MAX_TTL_MINUTES: i64 = 10 * 365 * 24 * 60;

/// Fatal configuration problems, surfaced once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_EXPIRE_MINUTES must be an integer between 1 and {MAX_TTL_MINUTES}, got {0:?}")]
    InvalidTtl(String),
    #[error("unsupported JWT algorithm {0:?}: only HS256, HS384 and HS512 are accepted")]
    UnsupportedAlgorithm(String),
    #[error("invalid listen address {0:?}")]
    InvalidAddr(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: String,
    pub static_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let ttl_raw = var("JWT_EXPIRE_MINUTES", "60");
        let ttl_minutes = ttl_raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|m| (1..=MAX_TTL_MINUTES).contains(m))
            .ok_or_else(|| ConfigError::InvalidTtl(ttl_raw.clone()))?;

        let secret = var("JWT_SECRET_KEY", DEFAULT_JWT_SECRET);
        if secret == DEFAULT_JWT_SECRET {
            tracing::warn!("JWT_SECRET_KEY not set; using the development placeholder");
        }

        let jwt = JwtConfig {
            secret,
            algorithm: var("JWT_ALGORITHM", "HS256"),
            ttl_minutes,
        };

        Ok(Self {
            database_url: var("DATABASE_URL", DEFAULT_DATABASE_URL),
            jwt,
            host: var("APP_HOST", "0.0.0.0"),
            port: var("APP_PORT", "8080"),
            static_dir: var("STATIC_DIR", "static"),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddr(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = load(&[]).expect("defaults load");
        assert_eq!(cfg.database_url, "sqlite://app.db");
        assert_eq!(cfg.jwt.secret, "dev-secret-change-me");
        assert_eq!(cfg.jwt.algorithm, "HS256");
        assert_eq!(cfg.jwt.ttl_minutes, 60);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, "8080");
        assert_eq!(cfg.static_dir, "static");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let cfg = load(&[
            ("DATABASE_URL", ""),
            ("JWT_SECRET_KEY", "  "),
            ("JWT_ALGORITHM", ""),
            ("JWT_EXPIRE_MINUTES", ""),
        ])
        .expect("empty values fall back");
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.jwt.secret, DEFAULT_JWT_SECRET);
        assert_eq!(cfg.jwt.algorithm, "HS256");
        assert_eq!(cfg.jwt.ttl_minutes, 60);
    }

    #[test]
    fn explicit_values_win() {
        let cfg = load(&[
            ("DATABASE_URL", "sqlite://other.db"),
            ("JWT_SECRET_KEY", "real-secret"),
            ("JWT_ALGORITHM", "HS512"),
            ("JWT_EXPIRE_MINUTES", " 15 "),
        ])
        .expect("valid config");
        assert_eq!(cfg.database_url, "sqlite://other.db");
        assert_eq!(cfg.jwt.secret, "real-secret");
        assert_eq!(cfg.jwt.algorithm, "HS512");
        assert_eq!(cfg.jwt.ttl_minutes, 15);
    }

    #[test]
    fn bad_ttl_is_a_config_error() {
        let too_long = (MAX_TTL_MINUTES + 1).to_string();
        for raw in ["abc", "0", "-5", "1.5", too_long.as_str()] {
            let res = load(&[("JWT_EXPIRE_MINUTES", raw)]);
            assert!(
                matches!(res, Err(ConfigError::InvalidTtl(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn listen_addr_parses_host_and_port() {
        let cfg = load(&[("APP_HOST", "127.0.0.1"), ("APP_PORT", "9000")]).unwrap();
        let addr = cfg.listen_addr().expect("valid addr");
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn listen_addr_rejects_garbage_port() {
        let cfg = load(&[("APP_PORT", "not-a-port")]).unwrap();
        assert!(matches!(cfg.listen_addr(), Err(ConfigError::InvalidAddr(_))));
    }
}
