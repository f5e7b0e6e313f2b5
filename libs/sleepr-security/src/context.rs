use std::sync::{Arc, OnceLock};

use crate::identity::ResolvedIdentity;

/// Errors raised by [`RequestContext`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// No identity is attached: the request took the unauthenticated path,
    /// was rejected, or is being read before the guard ran.
    #[error("no identity attached to request context")]
    NoIdentity,

    /// An identity was already attached to this request.
    #[error("identity already attached to request context")]
    AlreadyAttached,
}

/// Per-request identity slot.
///
/// Created fresh for every inbound request and written at most once, before
/// any domain logic runs. Clones share the same slot, so the copy placed in
/// request extensions observes the guard's attachment. Nothing outlives the
/// request.
#[derive(Clone, Default)]
pub struct RequestContext {
    identity: Arc<OnceLock<ResolvedIdentity>>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the resolved identity.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::AlreadyAttached`] if an identity is already present;
    /// the existing identity is left untouched.
    pub fn attach(&self, identity: ResolvedIdentity) -> Result<(), ContextError> {
        self.identity
            .set(identity)
            .map_err(|_| ContextError::AlreadyAttached)
    }

    /// The attached identity.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::NoIdentity`] when nothing has been attached.
    pub fn identity(&self) -> Result<&ResolvedIdentity, ContextError> {
        self.identity.get().ok_or(ContextError::NoIdentity)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.get().is_some()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("identity_id", &self.identity.get().map(|i| i.id))
            .finish()
    }
}
