//! Static identity authority.
//!
//! Resolves credentials from configuration instead of calling the remote
//! identity authority. Intended for local development and tests:
//!
//! - `accept_all`: any non-empty credential resolves to `default_identity`
//! - `static_tokens`: only the configured credentials resolve, each to its own identity
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;

pub use config::{AuthorityMode, IdentityConfig, StaticIdentityPluginConfig, TokenMapping};
pub use domain::Service;
