#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Security primitives shared by every Sleepr service.
//!
//! - [`Credential`] - opaque bearer credential pulled from an inbound request
//! - [`ResolvedIdentity`] - identity returned by the identity authority
//! - [`RoleName`], [`RoleSet`], [`RequiredRoles`] - role model
//! - [`policy::evaluate`] - role policy evaluator
//! - [`RequestContext`] - per-request identity attachment slot

pub mod context;
pub mod credential;
pub mod identity;
pub mod policy;
pub mod roles;

pub use context::{ContextError, RequestContext};
pub use credential::Credential;
pub use identity::ResolvedIdentity;
pub use policy::{PolicyDecision, evaluate};
pub use roles::{RequiredRoles, RoleName, RoleSet};
