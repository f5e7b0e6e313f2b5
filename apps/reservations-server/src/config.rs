//! Server configuration.
//!
//! Layered, later layers win:
//! 1. built-in defaults
//! 2. YAML file passed with `--config`
//! 3. `SLEEPR__`-prefixed environment variables, `__` separating nested keys
//!    (e.g. `SLEEPR__GUARD__AUTHORITY_TIMEOUT_MS=500`)

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use auth_guard::GuardConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use identity_authority_grpc::GrpcAuthorityConfig;
use serde::{Deserialize, Serialize};
use static_identity_plugin::StaticIdentityPluginConfig;

const ENV_PREFIX: &str = "SLEEPR__";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub guard: GuardConfig,
    pub authority: AuthorityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Whole-request deadline; exceeding it yields `504 Gateway Timeout`.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
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

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: "info".to_owned(),
        }
    }
}

/// Which identity authority implementation answers credential checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityBackend {
    /// Remote `auth.AuthService` over gRPC.
    #[default]
    Grpc,
    /// In-process static mapping. Development and tests only.
    Static,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorityConfig {
    pub backend: AuthorityBackend,
    pub grpc: GrpcAuthorityConfig,
    #[serde(rename = "static")]
    pub static_identity: StaticIdentityPluginConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        let cfg: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guard.authority_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "guard.authority_timeout_ms must be greater than zero".to_owned(),
            ));
        }
        if self.guard.credential_sources.is_empty() {
            return Err(ConfigError::Invalid(
                "guard.credential_sources must not be empty".to_owned(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must be greater than zero".to_owned(),
            ));
        }
        if self.server.request_timeout() <= self.guard.authority_timeout() {
            return Err(ConfigError::Invalid(
                "server.request_timeout_secs must exceed guard.authority_timeout_ms".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.authority.backend, AuthorityBackend::Grpc);
        assert_eq!(cfg.guard.authority_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn yaml_and_env_layers_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sleepr.yaml",
                r#"
server:
  bind_addr: "0.0.0.0:9000"
logging:
  format: json
authority:
  backend: static
  static:
    mode: static_tokens
    tokens:
      - token: tok-A
        identity: { id: 1, email: a@sleepr.dev, roles: [Admin] }
"#,
            )?;
            jail.set_env("SLEEPR__GUARD__AUTHORITY_TIMEOUT_MS", "750");

            let cfg = AppConfig::load(Some(Path::new("sleepr.yaml")))
                .map_err(|e| figment::Error::from(e.to_string()))?;

            assert_eq!(cfg.server.bind_addr.port(), 9000);
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(cfg.authority.backend, AuthorityBackend::Static);
            assert_eq!(cfg.authority.static_identity.tokens.len(), 1);
            assert_eq!(cfg.guard.authority_timeout(), Duration::from_millis(750));
            Ok(())
        });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("sleepr.yaml", "guard:\n  auth_disabled: true\n")?;
            let result = AppConfig::load(Some(Path::new("sleepr.yaml")));
            assert!(matches!(result, Err(ConfigError::Load(_))));
            Ok(())
        });
    }

    #[test]
    fn zero_authority_timeout_is_invalid() {
        let mut cfg = AppConfig::default();
        cfg.guard.authority_timeout_ms = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn request_timeout_must_exceed_authority_timeout() {
        let mut cfg = AppConfig::default();
        cfg.server.request_timeout_secs = 2;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
