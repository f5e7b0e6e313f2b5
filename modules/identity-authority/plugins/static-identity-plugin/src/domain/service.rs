//! Service implementation for the static identity authority.

use std::collections::HashMap;

use sleepr_security::ResolvedIdentity;

use crate::config::{AuthorityMode, StaticIdentityPluginConfig};

/// Static identity authority.
///
/// Resolution depends on the configured mode:
/// - `accept_all`: any non-empty credential maps to the default identity
/// - `static_tokens`: specific credentials map to specific identities
pub struct Service {
    mode: AuthorityMode,
    default_identity: ResolvedIdentity,
    token_map: HashMap<String, ResolvedIdentity>,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticIdentityPluginConfig) -> Self {
        let token_map: HashMap<String, ResolvedIdentity> = cfg
            .tokens
            .iter()
            .map(|m| (m.token.clone(), m.identity.to_identity()))
            .collect();

        Self {
            mode: cfg.mode,
            default_identity: cfg.default_identity.to_identity(),
            token_map,
        }
    }

    /// Resolve a credential into an identity.
    ///
    /// Returns `None` if the credential is empty or, in `static_tokens` mode,
    /// not configured.
    #[must_use]
    pub fn authenticate(&self, credential: &str) -> Option<ResolvedIdentity> {
        if credential.is_empty() {
            return None;
        }

        match self.mode {
            AuthorityMode::AcceptAll => Some(self.default_identity.clone()),
            AuthorityMode::StaticTokens => self.token_map.get(credential).cloned(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::{IdentityConfig, TokenMapping};

    fn mapping(token: &str, id: i64, roles: &[&str]) -> TokenMapping {
        TokenMapping {
            token: token.to_owned(),
            identity: IdentityConfig {
                id,
                email: format!("user{id}@sleepr.dev"),
                roles: roles.iter().map(|r| (*r).to_owned()).collect(),
            },
        }
    }

    #[test]
    fn accept_all_mode_returns_default_identity() {
        let cfg = StaticIdentityPluginConfig {
            mode: AuthorityMode::AcceptAll,
            ..StaticIdentityPluginConfig::default()
        };
        let service = Service::from_config(&cfg);

        let identity = service.authenticate("any-token-value").unwrap();
        assert_eq!(identity.id, 1);
        assert_eq!(identity.email, "dev@sleepr.local");
        assert!(identity.roles.is_empty());
    }

    #[test]
    fn accept_all_mode_rejects_empty_credential() {
        let cfg = StaticIdentityPluginConfig {
            mode: AuthorityMode::AcceptAll,
            ..StaticIdentityPluginConfig::default()
        };
        let service = Service::from_config(&cfg);

        assert!(service.authenticate("").is_none());
    }

    #[test]
    fn static_tokens_mode_returns_mapped_identity() {
        let cfg = StaticIdentityPluginConfig {
            tokens: vec![
                mapping("tok-A", 1, &["Admin"]),
                mapping("tok-B", 2, &["Member"]),
            ],
            ..StaticIdentityPluginConfig::default()
        };
        let service = Service::from_config(&cfg);

        let a = service.authenticate("tok-A").unwrap();
        assert_eq!(a.id, 1);
        assert!(a.has_role("Admin"));

        let b = service.authenticate("tok-B").unwrap();
        assert_eq!(b.id, 2);
        assert!(!b.has_role("Admin"));
    }

    #[test]
    fn static_tokens_mode_rejects_unknown_credential() {
        let cfg = StaticIdentityPluginConfig {
            tokens: vec![mapping("known-token", 1, &[])],
            ..StaticIdentityPluginConfig::default()
        };
        let service = Service::from_config(&cfg);

        assert!(service.authenticate("unknown-token").is_none());
    }
}
