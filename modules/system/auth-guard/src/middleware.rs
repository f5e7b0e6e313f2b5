use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use http::{HeaderMap, Method, header};
use identity_authority_sdk::IdentityAuthorityClient;
use sleepr_security::RequestContext;

use crate::config::GuardConfig;
use crate::extractor::{CredentialExtractor, ExtractorError};
use crate::guard::AuthGuard;
use crate::routes::{Access, RoutePolicy};

/// Shared state for [`guard_middleware`]. Cheap to clone.
#[derive(Clone)]
pub struct GuardState {
    pub guard: Arc<AuthGuard>,
    pub extractor: Arc<CredentialExtractor>,
    pub policy: RoutePolicy,
}

impl GuardState {
    #[must_use]
    pub fn new(guard: AuthGuard, extractor: CredentialExtractor, policy: RoutePolicy) -> Self {
        Self {
            guard: Arc::new(guard),
            extractor: Arc::new(extractor),
            policy,
        }
    }

    /// # Errors
    ///
    /// Returns an error if the configured credential sources are invalid.
    pub fn from_config(
        cfg: &GuardConfig,
        authority: Arc<dyn IdentityAuthorityClient>,
        policy: RoutePolicy,
    ) -> Result<Self, ExtractorError> {
        let extractor = CredentialExtractor::new(&cfg.credential_sources)?;
        let guard = AuthGuard::new(authority, cfg.authority_timeout());
        Ok(Self::new(guard, extractor, policy))
    }

    /// Install the guard in front of every route of `router`.
    #[must_use]
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(from_fn_with_state(self, guard_middleware))
    }
}

/// Guard middleware.
///
/// For each request:
/// 1. Skips CORS preflight requests
/// 2. Inserts a fresh `RequestContext` into the request extensions
/// 3. Resolves the route's [`Access`] via [`RoutePolicy`]
/// 4. For guarded routes: extracts the credential and runs the [`AuthGuard`],
///    short-circuiting with a problem response on rejection
pub async fn guard_middleware(
    State(state): State<GuardState>,
    mut req: Request,
    next: Next,
) -> Response {
    if is_preflight_request(req.method(), req.headers()) {
        return next.run(req).await;
    }

    let ctx = RequestContext::new();
    req.extensions_mut().insert(ctx.clone());

    match state.policy.resolve(req.method(), req.uri().path()) {
        Access::Public => next.run(req).await,
        Access::Guarded(required) => {
            let credential = state.extractor.extract(req.headers());
            match state.guard.guard(credential, &required, &ctx).await {
                Ok(_) => next.run(req).await,
                Err(err) => err.into_response(),
            }
        }
    }
}

/// Preflight requests are OPTIONS requests carrying both `Origin` and
/// `Access-Control-Request-Method`.
fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn preflight_needs_origin_and_request_method() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, "https://sleepr.dev".parse().unwrap());
        assert!(!is_preflight_request(&Method::OPTIONS, &headers));

        headers.insert(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            "DELETE".parse().unwrap(),
        );
        assert!(is_preflight_request(&Method::OPTIONS, &headers));
        assert!(!is_preflight_request(&Method::DELETE, &headers));
    }
}
