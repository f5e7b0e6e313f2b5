use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::extractor::CredentialSource;

fn default_credential_sources() -> Vec<CredentialSource> {
    vec![
        CredentialSource::Cookie {
            name: "Authentication".to_owned(),
        },
        CredentialSource::Authorization,
    ]
}

fn default_authority_timeout_ms() -> u64 {
    3_000
}

fn default_require_auth_by_default() -> bool {
    true
}

/// Guard configuration, shared by every service that installs the guard.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GuardConfig {
    /// Where to look for the credential, in order. First non-empty value wins.
    #[serde(default = "default_credential_sources")]
    pub credential_sources: Vec<CredentialSource>,

    /// Hard deadline for the identity authority call. Exceeding it rejects the
    /// request as unauthenticated.
    #[serde(default = "default_authority_timeout_ms")]
    pub authority_timeout_ms: u64,

    /// If true, routes that were never registered still require authentication.
    #[serde(default = "default_require_auth_by_default")]
    pub require_auth_by_default: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            credential_sources: default_credential_sources(),
            authority_timeout_ms: default_authority_timeout_ms(),
            require_auth_by_default: default_require_auth_by_default(),
        }
    }
}

impl GuardConfig {
    #[must_use]
    pub fn authority_timeout(&self) -> Duration {
        Duration::from_millis(self.authority_timeout_ms)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: GuardConfig = serde_json::from_value(serde_json::json!({})).unwrap();

        assert_eq!(cfg.authority_timeout(), Duration::from_secs(3));
        assert!(cfg.require_auth_by_default);
        assert_eq!(
            cfg.credential_sources,
            vec![
                CredentialSource::Cookie {
                    name: "Authentication".to_owned()
                },
                CredentialSource::Authorization,
            ]
        );
    }

    #[test]
    fn credential_sources_are_tagged_by_kind() {
        let cfg: GuardConfig = serde_json::from_value(serde_json::json!({
            "credential_sources": [
                { "kind": "header", "name": "x-api-token" },
                { "kind": "authorization" }
            ],
            "authority_timeout_ms": 250
        }))
        .unwrap();

        assert_eq!(cfg.authority_timeout(), Duration::from_millis(250));
        assert_eq!(
            cfg.credential_sources[0],
            CredentialSource::Header {
                name: "x-api-token".to_owned()
            }
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<GuardConfig, _> =
            serde_json::from_value(serde_json::json!({ "auth_disabled": true }));
        assert!(result.is_err());
    }
}
