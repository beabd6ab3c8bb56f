//! Gateway configuration, read from the environment (after `.env` is loaded).
//!
//! - `GATEWAY_BIND_ADDR`: listen address (default `0.0.0.0:3001`)
//! - `EKOMKASSA_BASE_URL`: upstream API root (default `https://app.ecomkassa.ru/fiscalorder/v5`)
//! - `EKOMKASSA_AUTH_TIMEOUT_SECS` / `EKOMKASSA_STATUS_TIMEOUT_SECS` (default 10)
//! - `EKOMKASSA_RECEIPT_TIMEOUT_SECS` (default 30; fiscal registration is slow)
//! - `DATABASE_URL`: optional Postgres URL for the request log sink

use std::time::Duration;

use tracing::warn;

use crate::engine::request::RequestKind;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://app.ecomkassa.ru/fiscalorder/v5";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: String,
    pub upstream_base_url: String,
    pub auth_timeout: Duration,
    pub status_timeout: Duration,
    pub receipt_timeout: Duration,
    pub database_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            auth_timeout: Duration::from_secs(10),
            status_timeout: Duration::from_secs(10),
            receipt_timeout: Duration::from_secs(30),
            database_url: None,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable timeouts keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secs = |key: &str, default: Duration| match non_empty(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
                    default
                }
            },
        };

        Self {
            bind_addr: non_empty("GATEWAY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            upstream_base_url: non_empty("EKOMKASSA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream_base_url),
            auth_timeout: secs("EKOMKASSA_AUTH_TIMEOUT_SECS", defaults.auth_timeout),
            status_timeout: secs("EKOMKASSA_STATUS_TIMEOUT_SECS", defaults.status_timeout),
            receipt_timeout: secs("EKOMKASSA_RECEIPT_TIMEOUT_SECS", defaults.receipt_timeout),
            database_url: non_empty("DATABASE_URL"),
        }
    }

    pub fn timeout_for(&self, kind: RequestKind) -> Duration {
        match kind {
            RequestKind::Auth => self.auth_timeout,
            RequestKind::Status => self.status_timeout,
            RequestKind::Receipt => self.receipt_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> GatewayConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.upstream_base_url, DEFAULT_UPSTREAM_BASE_URL);
        assert_eq!(config.timeout_for(RequestKind::Auth), Duration::from_secs(10));
        assert_eq!(config.timeout_for(RequestKind::Status), Duration::from_secs(10));
        assert_eq!(config.timeout_for(RequestKind::Receipt), Duration::from_secs(30));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("GATEWAY_BIND_ADDR", "127.0.0.1:8080"),
            ("EKOMKASSA_BASE_URL", "http://localhost:9000/v5/"),
            ("EKOMKASSA_RECEIPT_TIMEOUT_SECS", "60"),
            ("DATABASE_URL", "postgres://gw@localhost/gw"),
        ]);
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.upstream_base_url, "http://localhost:9000/v5");
        assert_eq!(config.receipt_timeout, Duration::from_secs(60));
        assert_eq!(config.database_url.as_deref(), Some("postgres://gw@localhost/gw"));
    }

    #[test]
    fn test_invalid_timeout_keeps_default() {
        let config = config_from(&[
            ("EKOMKASSA_AUTH_TIMEOUT_SECS", "soon"),
            ("EKOMKASSA_STATUS_TIMEOUT_SECS", "0"),
            ("DATABASE_URL", "  "),
        ]);
        assert_eq!(config.auth_timeout, Duration::from_secs(10));
        assert_eq!(config.status_timeout, Duration::from_secs(10));
        assert!(config.database_url.is_none());
    }
}
