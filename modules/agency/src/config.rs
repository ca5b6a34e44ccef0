//! Application configuration.
//!
//! Every section has defaults, so an empty document is a valid
//! configuration apart from `auth.jwt_secret`.

use std::time::Duration;

use agency_db::{DbConfig, PageLimits};
use serde::{Deserialize, Serialize};

use crate::auth::AuthConfig;
use crate::domain::service::ServiceConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DbConfig,
    pub auth: AuthConfig,
    pub pagination: PageLimits,
    pub logging: LoggingConfig,
}

impl AppConfig {
    #[must_use]
    pub fn services(&self) -> ServiceConfig {
        ServiceConfig {
            pagination: self.pagination,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_owned(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: String,
    /// One JSON object per line instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,agency=debug".to_owned(),
            json: false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg: AppConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(cfg.server, ServerConfig::default());
        assert_eq!(cfg.database, DbConfig::default());
        assert_eq!(cfg.pagination, PageLimits::default());
        assert_eq!(cfg.auth.token_ttl_secs, crate::auth::token::DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    fn sections_override_their_fields_only() {
        let yaml = r"
server:
  bind_addr: 0.0.0.0:8080
auth:
  jwt_secret: a-long-enough-test-secret
pagination:
  max_limit: 50
";
        let cfg: AppConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.server.request_timeout_secs, 30);
        assert_eq!(cfg.auth.jwt_secret.expose_secret(), "a-long-enough-test-secret");
        assert_eq!(cfg.services().pagination.max_limit, 50);
        assert_eq!(cfg.services().pagination.default_limit, 20);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_saphyr::from_str::<AppConfig>("serverr: {}\n").is_err());
        assert!(serde_saphyr::from_str::<AppConfig>("logging:\n  level: info\n").is_err());
    }

    #[test]
    fn printed_config_hides_the_secret() {
        let cfg: AppConfig =
            serde_saphyr::from_str("auth:\n  jwt_secret: a-long-enough-test-secret\n").unwrap();
        let printed = serde_json::to_string(&cfg).unwrap();
        assert!(!printed.contains("a-long-enough-test-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
