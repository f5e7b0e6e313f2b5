//! The per-request authorization pipeline.
//!
//! ```text
//! Start -> CredentialExtracted -> Authenticated -> Authorized -> Admitted
//!   \              \                    \               \
//!    `--------------`--------------------`---------------`--> Rejected
//! ```
//!
//! Stages run strictly in order; the identity authority call is the only
//! suspension point. Every failure is converted into one of two caller-visible
//! outcomes, [`Rejection::Unauthenticated`] or [`Rejection::Forbidden`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::response::{IntoResponse, Response};
use identity_authority_sdk::{AuthFailure, IdentityAuthorityClient};
use sleepr_security::{
    Credential, PolicyDecision, RequestContext, RequiredRoles, ResolvedIdentity, RoleName,
    policy,
};

use crate::problem::Problem;

/// Pipeline stage. A rejection is attributed to the last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStage {
    Start,
    CredentialExtracted,
    Authenticated,
    Authorized,
    Admitted,
}

impl GuardStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CredentialExtracted => "credential_extracted",
            Self::Authenticated => "authenticated",
            Self::Authorized => "authorized",
            Self::Admitted => "admitted",
        }
    }
}

impl fmt::Display for GuardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-visible outcome of a rejected request. Carries no detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Unauthenticated,
    Forbidden,
}

/// Why the guard rejected a request. Detail is for internal logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("no credential on request")]
    MissingCredential,

    #[error("identity authority unreachable: {0}")]
    AuthorityUnreachable(String),

    #[error("identity authority timed out after {0:?}")]
    AuthorityTimeout(Duration),

    #[error("credential rejected by identity authority: {0}")]
    InvalidCredential(String),

    #[error("identity {identity_id} lacks required roles {missing:?}")]
    InsufficientRole {
        identity_id: i64,
        missing: Vec<RoleName>,
    },

    #[error("request context already carries an identity")]
    IdentityAlreadyAttached,
}

impl GuardError {
    #[must_use]
    pub fn outcome(&self) -> Rejection {
        match self {
            Self::InsufficientRole { .. } => Rejection::Forbidden,
            Self::MissingCredential
            | Self::AuthorityUnreachable(_)
            | Self::AuthorityTimeout(_)
            | Self::InvalidCredential(_)
            | Self::IdentityAlreadyAttached => Rejection::Unauthenticated,
        }
    }

    /// The stage the pipeline had reached when it rejected.
    #[must_use]
    pub fn stage(&self) -> GuardStage {
        match self {
            Self::MissingCredential => GuardStage::Start,
            Self::AuthorityUnreachable(_)
            | Self::AuthorityTimeout(_)
            | Self::InvalidCredential(_) => GuardStage::CredentialExtracted,
            Self::InsufficientRole { .. } => GuardStage::Authenticated,
            Self::IdentityAlreadyAttached => GuardStage::Authorized,
        }
    }
}

impl From<AuthFailure> for GuardError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::Unreachable(msg) => Self::AuthorityUnreachable(msg),
            AuthFailure::Timeout(after) => Self::AuthorityTimeout(after),
            AuthFailure::InvalidCredential(msg) | AuthFailure::MalformedIdentity(msg) => {
                Self::InvalidCredential(msg)
            }
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        match self.outcome() {
            Rejection::Unauthenticated => Problem::unauthorized().into_response(),
            Rejection::Forbidden => Problem::forbidden().into_response(),
        }
    }
}

/// Orchestrates authentication and role authorization for one request at a time.
///
/// Holds the identity authority client for its whole lifetime; the client is
/// the only state shared between concurrent requests.
pub struct AuthGuard {
    authority: Arc<dyn IdentityAuthorityClient>,
    authority_timeout: Duration,
}

impl AuthGuard {
    #[must_use]
    pub fn new(authority: Arc<dyn IdentityAuthorityClient>, authority_timeout: Duration) -> Self {
        Self {
            authority,
            authority_timeout,
        }
    }

    /// Run the pipeline up to `Authorized`.
    ///
    /// A missing credential is rejected without contacting the authority,
    /// even when `required` is empty.
    ///
    /// # Errors
    ///
    /// Returns the [`GuardError`] of the first stage that rejected.
    pub async fn admit(
        &self,
        credential: Option<Credential>,
        required: &RequiredRoles,
    ) -> Result<ResolvedIdentity, GuardError> {
        let result = self.run(credential, required).await;
        if let Err(err) = &result {
            log_rejection(err);
        }
        result
    }

    /// Run the full pipeline and attach the identity to `ctx` on success.
    ///
    /// # Errors
    ///
    /// Returns the [`GuardError`] of the first stage that rejected; nothing is
    /// attached in that case.
    pub async fn guard(
        &self,
        credential: Option<Credential>,
        required: &RequiredRoles,
        ctx: &RequestContext,
    ) -> Result<GuardStage, GuardError> {
        let identity = self.admit(credential, required).await?;
        let identity_id = identity.id;

        ctx.attach(identity).map_err(|_| {
            let err = GuardError::IdentityAlreadyAttached;
            log_rejection(&err);
            err
        })?;

        tracing::debug!(identity_id, "request admitted");
        Ok(GuardStage::Admitted)
    }

    async fn run(
        &self,
        credential: Option<Credential>,
        required: &RequiredRoles,
    ) -> Result<ResolvedIdentity, GuardError> {
        let credential = credential.ok_or(GuardError::MissingCredential)?;

        let identity = self.authenticate(&credential).await?;

        match policy::evaluate(&identity.roles, required) {
            PolicyDecision::Admit => Ok(identity),
            PolicyDecision::Deny { missing } => Err(GuardError::InsufficientRole {
                identity_id: identity.id,
                missing,
            }),
        }
    }

    async fn authenticate(&self, credential: &Credential) -> Result<ResolvedIdentity, GuardError> {
        match tokio::time::timeout(
            self.authority_timeout,
            self.authority.authenticate(credential),
        )
        .await
        {
            Ok(result) => result.map_err(GuardError::from),
            Err(_elapsed) => Err(GuardError::AuthorityTimeout(self.authority_timeout)),
        }
    }
}

/// Log rejections at a level matching their cause.
///
/// Cognitive complexity is inflated by tracing macro expansion.
#[allow(clippy::cognitive_complexity)]
fn log_rejection(err: &GuardError) {
    let stage = err.stage().as_str();
    match err {
        GuardError::MissingCredential | GuardError::InvalidCredential(_) => {
            tracing::debug!(stage, "authentication rejected: {err}");
        }
        GuardError::InsufficientRole { .. } => {
            tracing::warn!(stage, "authorization denied: {err}");
        }
        GuardError::AuthorityUnreachable(_)
        | GuardError::AuthorityTimeout(_)
        | GuardError::IdentityAlreadyAttached => {
            tracing::error!(stage, "authentication failed: {err}");
        }
    }
}
