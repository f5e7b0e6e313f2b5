//! Public API trait for the identity authority.

use async_trait::async_trait;
use sleepr_security::{Credential, ResolvedIdentity};

use crate::error::AuthFailure;

/// Client for the remote identity authority.
///
/// The authority is the single source of truth for credential validity:
/// callers must not attempt any local verification of the credential.
///
/// Implementations are shared across all in-flight requests, so they must be
/// safe for concurrent use and hold no per-call mutable state beyond the
/// underlying connection.
#[async_trait]
pub trait IdentityAuthorityClient: Send + Sync {
    /// Resolve a credential into the identity it belongs to.
    ///
    /// # Errors
    ///
    /// - `Unreachable` if the authority cannot be reached
    /// - `Timeout` if the call exceeded its deadline
    /// - `InvalidCredential` if the authority rejected the credential
    /// - `MalformedIdentity` if the authority's answer is unusable
    async fn authenticate(&self, credential: &Credential)
    -> Result<ResolvedIdentity, AuthFailure>;
}
