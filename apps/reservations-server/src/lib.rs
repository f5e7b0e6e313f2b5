//! Sleepr reservations service.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod logging;

use std::sync::Arc;

use auth_guard::GuardState;
use axum::Router;
use axum::http::{HeaderName, StatusCode};
use identity_authority_grpc::GrpcIdentityAuthorityClient;
use identity_authority_sdk::IdentityAuthorityClient;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::AppState;
use crate::config::{AppConfig, AuthorityBackend, AuthorityConfig};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the identity authority client selected by configuration.
///
/// # Errors
///
/// Fails if the gRPC endpoint is not a valid URI.
pub fn build_authority(cfg: &AuthorityConfig) -> anyhow::Result<Arc<dyn IdentityAuthorityClient>> {
    match cfg.backend {
        AuthorityBackend::Grpc => {
            let client = GrpcIdentityAuthorityClient::new(&cfg.grpc)?;
            Ok(Arc::new(client))
        }
        AuthorityBackend::Static => {
            tracing::warn!(
                "Identity authority is STATIC: credentials are resolved from configuration. \
                 Intended ONLY for development and tests."
            );
            Ok(Arc::new(static_identity_plugin::Service::from_config(
                &cfg.static_identity,
            )))
        }
    }
}

/// Assemble the HTTP application.
///
/// Request execution order (outermost -> innermost):
/// `SetRequestId` -> `PropagateRequestId` -> `Trace` -> `Timeout` -> guard -> router
///
/// # Errors
///
/// Fails if route registration or the guard configuration is invalid.
pub fn build_app(
    cfg: &AppConfig,
    authority: Arc<dyn IdentityAuthorityClient>,
    state: AppState,
) -> anyhow::Result<Router> {
    let (router, policy) = api::routes(state, cfg.guard.require_auth_by_default)?;

    let mut router = GuardState::from_config(&cfg.guard, authority, policy)?.apply(router);

    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        cfg.server.request_timeout(),
    ));
    router = router.layer(TraceLayer::new_for_http().make_span_with(
        |req: &axum::http::Request<axum::body::Body>| {
            let rid = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("n/a");
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri().path(),
                request_id = %rid,
            )
        },
    ));

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    Ok(router)
}
