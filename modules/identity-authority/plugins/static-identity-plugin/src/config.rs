//! Configuration for the static identity authority.

use serde::{Deserialize, Serialize};

use sleepr_security::{ResolvedIdentity, RoleSet};

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct StaticIdentityPluginConfig {
    /// Resolution mode.
    pub mode: AuthorityMode,

    /// Identity returned in `accept_all` mode.
    pub default_identity: IdentityConfig,

    /// Credential-to-identity mappings for `static_tokens` mode.
    pub tokens: Vec<TokenMapping>,
}

/// Resolution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityMode {
    /// Accept any non-empty credential and return the default identity.
    AcceptAll,
    /// Map specific credentials to specific identities.
    #[default]
    StaticTokens,
}

/// Identity returned for a credential.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub id: i64,
    pub email: String,
    pub roles: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id: 1,
            email: "dev@sleepr.local".to_owned(),
            roles: Vec::new(),
        }
    }
}

impl IdentityConfig {
    #[must_use]
    pub fn to_identity(&self) -> ResolvedIdentity {
        ResolvedIdentity::new(
            self.id,
            self.email.clone(),
            self.roles.iter().map(String::as_str).collect::<RoleSet>(),
        )
    }
}

/// Maps a static credential to a specific identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TokenMapping {
    /// The credential value to match.
    pub token: String,
    /// The identity to return when this credential is presented.
    pub identity: IdentityConfig,
}
