//! Authorization guard for Sleepr services.
//!
//! Every inbound request to a guarded endpoint runs the same pipeline:
//!
//! 1. [`CredentialExtractor`] pulls the bearer credential (cookie or header)
//! 2. [`AuthGuard`] delegates verification to the identity authority
//! 3. the endpoint's statically declared `RequiredRoles` are enforced
//! 4. the resolved identity is attached to the request's `RequestContext`
//!
//! Any failure short-circuits with `401 Unauthorized` or `403 Forbidden`.
//! Endpoints declare their access with [`Endpoint`] and are collected by
//! [`GuardedRoutes`]; [`GuardState::apply`] installs [`guard_middleware`].
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod axum_ext;
pub mod config;
pub mod extractor;
pub mod guard;
pub mod middleware;
pub mod problem;
pub mod routes;

pub use axum_ext::{CurrentIdentity, IdentityRejection, MaybeIdentity};
pub use config::GuardConfig;
pub use extractor::{CredentialExtractor, CredentialSource, ExtractorError};
pub use guard::{AuthGuard, GuardError, GuardStage, Rejection};
pub use middleware::{GuardState, guard_middleware};
pub use problem::Problem;
pub use routes::{Access, Endpoint, GuardedRoutes, RoutePolicy};
