//! Role policy evaluation.
//!
//! An endpoint with no required roles admits any authenticated identity.
//! Otherwise the identity must hold every required role.

use crate::roles::{RequiredRoles, RoleName, RoleSet};

/// Outcome of evaluating an identity's roles against an endpoint's policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Admit,
    /// `missing` is sorted and never empty.
    Deny { missing: Vec<RoleName> },
}

impl PolicyDecision {
    #[must_use]
    pub fn is_admit(&self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Evaluate `identity_roles` against `required`.
///
/// Pure and deterministic: identical inputs always yield identical output.
#[must_use]
pub fn evaluate(identity_roles: &RoleSet, required: &RequiredRoles) -> PolicyDecision {
    if required.is_empty() {
        return PolicyDecision::Admit;
    }

    let missing = required.roles().missing_from(identity_roles);
    if missing.is_empty() {
        PolicyDecision::Admit
    } else {
        PolicyDecision::Deny { missing }
    }
}
