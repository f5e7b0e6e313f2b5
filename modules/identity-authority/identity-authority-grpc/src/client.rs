//! tonic-backed [`IdentityAuthorityClient`].

use std::time::Duration;

use async_trait::async_trait;
use identity_authority_sdk::{AuthFailure, IdentityAuthorityClient};
use sleepr_security::{Credential, ResolvedIdentity, RoleSet};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

use crate::config::GrpcAuthorityConfig;
use crate::proto::{AUTHENTICATE_PATH, AuthenticateRequest, UserMessage};

/// Errors building the client at startup.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid identity authority endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: tonic::transport::Error,
    },
}

/// RPC stub for `auth.AuthService`.
///
/// Holds a single lazily-connected [`Channel`]. Channels are cheap to clone
/// and multiplex concurrent calls, so every `authenticate` call works on its
/// own clone and no lock is taken.
#[derive(Clone)]
pub struct GrpcIdentityAuthorityClient {
    channel: Channel,
    request_timeout: Duration,
}

impl GrpcIdentityAuthorityClient {
    /// Build the client. No connection is attempted until the first call.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError::InvalidEndpoint`] if `endpoint` is not a valid URI.
    pub fn new(cfg: &GrpcAuthorityConfig) -> Result<Self, ClientBuildError> {
        let endpoint = Endpoint::from_shared(cfg.endpoint.clone())
            .map_err(|source| ClientBuildError::InvalidEndpoint {
                endpoint: cfg.endpoint.clone(),
                source,
            })?
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout());

        tracing::info!(
            endpoint = %cfg.endpoint,
            request_timeout_ms = cfg.request_timeout_ms,
            "identity authority client configured"
        );

        Ok(Self {
            channel: endpoint.connect_lazy(),
            request_timeout: cfg.request_timeout(),
        })
    }

    fn map_status(&self, status: &Status) -> AuthFailure {
        match status.code() {
            Code::Unauthenticated
            | Code::PermissionDenied
            | Code::NotFound
            | Code::InvalidArgument => AuthFailure::InvalidCredential(status.message().to_owned()),
            Code::DeadlineExceeded | Code::Cancelled => AuthFailure::Timeout(self.request_timeout),
            code => AuthFailure::Unreachable(format!(
                "{}: {}",
                code.description(),
                status.message()
            )),
        }
    }
}

/// Convert the authority's answer into a [`ResolvedIdentity`].
///
/// # Errors
///
/// Returns [`AuthFailure::MalformedIdentity`] if any role has an empty name.
pub fn into_identity(user: UserMessage) -> Result<ResolvedIdentity, AuthFailure> {
    if user.roles.iter().any(|r| r.name.trim().is_empty()) {
        return Err(AuthFailure::MalformedIdentity(format!(
            "user {} carries a role with an empty name",
            user.id
        )));
    }

    let roles: RoleSet = user.roles.into_iter().map(|r| r.name).collect();
    Ok(ResolvedIdentity::new(user.id, user.email, roles))
}

#[async_trait]
impl IdentityAuthorityClient for GrpcIdentityAuthorityClient {
    async fn authenticate(
        &self,
        credential: &Credential,
    ) -> Result<ResolvedIdentity, AuthFailure> {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| AuthFailure::Unreachable(format!("channel not ready: {e}")))?;

        let mut request = tonic::Request::new(AuthenticateRequest {
            authentication: credential.expose().to_owned(),
        });
        request.set_timeout(self.request_timeout);

        let codec = tonic_prost::ProstCodec::<AuthenticateRequest, UserMessage>::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(AUTHENTICATE_PATH), codec)
            .await
            .map_err(|status| self.map_status(&status))?;

        into_identity(response.into_inner())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::proto::RoleMessage;

    fn client() -> GrpcIdentityAuthorityClient {
        GrpcIdentityAuthorityClient::new(&GrpcAuthorityConfig::default()).unwrap()
    }

    fn role(name: &str) -> RoleMessage {
        RoleMessage {
            id: 1,
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn authority_verdicts_map_to_invalid_credential() {
        let client = client();
        for status in [
            Status::unauthenticated("jwt expired"),
            Status::permission_denied("revoked"),
            Status::not_found("no such user"),
            Status::invalid_argument("malformed token"),
        ] {
            assert!(matches!(
                client.map_status(&status),
                AuthFailure::InvalidCredential(_)
            ));
        }
    }

    #[tokio::test]
    async fn deadline_statuses_map_to_timeout() {
        let client = client();
        assert_eq!(
            client.map_status(&Status::deadline_exceeded("deadline")),
            AuthFailure::Timeout(Duration::from_secs(3))
        );
        assert_eq!(
            client.map_status(&Status::cancelled("Timeout expired")),
            AuthFailure::Timeout(Duration::from_secs(3))
        );
    }

    #[tokio::test]
    async fn other_statuses_map_to_unreachable() {
        let client = client();
        for status in [
            Status::unavailable("tcp connect error"),
            Status::unknown("transport error"),
            Status::internal("boom"),
        ] {
            assert!(matches!(
                client.map_status(&status),
                AuthFailure::Unreachable(_)
            ));
        }
    }

    #[test]
    fn identity_roles_are_collected_into_a_set() {
        let identity = into_identity(UserMessage {
            id: 1,
            email: "admin@sleepr.dev".to_owned(),
            roles: vec![role("Admin"), role("Member"), role("Admin")],
        })
        .unwrap();

        assert_eq!(identity.id, 1);
        assert_eq!(identity.roles.len(), 2);
        assert!(identity.has_role("Admin"));
    }

    #[test]
    fn identity_without_roles_is_accepted() {
        let identity = into_identity(UserMessage {
            id: 4,
            email: "guest@sleepr.dev".to_owned(),
            roles: vec![],
        })
        .unwrap();

        assert!(identity.roles.is_empty());
    }

    #[test]
    fn empty_role_name_is_malformed() {
        let result = into_identity(UserMessage {
            id: 2,
            email: "x@sleepr.dev".to_owned(),
            roles: vec![role("Member"), role("  ")],
        });

        assert!(matches!(result, Err(AuthFailure::MalformedIdentity(_))));
    }
}
