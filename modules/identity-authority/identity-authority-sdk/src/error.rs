//! Error types for the identity authority client.

use std::time::Duration;

use thiserror::Error;

/// Failures of a single `authenticate` call.
///
/// Messages are for internal logs only; callers of the guard never see them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// The authority could not be reached (connection refused, reset, DNS...).
    #[error("identity authority unreachable: {0}")]
    Unreachable(String),

    /// The call did not complete within its deadline.
    #[error("identity authority timed out after {0:?}")]
    Timeout(Duration),

    /// The authority explicitly rejected the credential (invalid, expired, malformed).
    #[error("credential rejected: {0}")]
    InvalidCredential(String),

    /// The authority answered, but with an identity that cannot be used.
    #[error("malformed identity from authority: {0}")]
    MalformedIdentity(String),
}

impl AuthFailure {
    /// Whether the failure happened at the transport level rather than being
    /// a verdict from the authority.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_classified() {
        assert!(AuthFailure::Unreachable("connection refused".to_owned()).is_transport());
        assert!(AuthFailure::Timeout(Duration::from_millis(50)).is_transport());
        assert!(!AuthFailure::InvalidCredential("expired".to_owned()).is_transport());
        assert!(!AuthFailure::MalformedIdentity("empty role".to_owned()).is_transport());
    }

    #[test]
    fn display_includes_detail_for_logs() {
        let err = AuthFailure::Unreachable("tcp connect error".to_owned());
        assert_eq!(err.to_string(), "identity authority unreachable: tcp connect error");
    }
}
