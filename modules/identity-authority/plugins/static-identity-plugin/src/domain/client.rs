//! `IdentityAuthorityClient` implementation for the static authority.

use async_trait::async_trait;
use identity_authority_sdk::{AuthFailure, IdentityAuthorityClient};
use sleepr_security::{Credential, ResolvedIdentity};

use super::service::Service;

#[async_trait]
impl IdentityAuthorityClient for Service {
    async fn authenticate(
        &self,
        credential: &Credential,
    ) -> Result<ResolvedIdentity, AuthFailure> {
        self.authenticate(credential.expose()).ok_or_else(|| {
            tracing::debug!("static authority: credential not recognized");
            AuthFailure::InvalidCredential("unknown credential".to_owned())
        })
    }
}
