use serde::{Deserialize, Serialize};

use crate::roles::RoleSet;

/// Identity returned by the identity authority for a valid credential.
///
/// Produced once per request and owned by that request's context; it is never
/// cached or shared across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub roles: RoleSet,
}

impl ResolvedIdentity {
    #[must_use]
    pub fn new(id: i64, email: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            id,
            email: email.into(),
            roles,
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
