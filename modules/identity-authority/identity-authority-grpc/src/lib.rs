//! gRPC client for the identity authority.
//!
//! [`GrpcIdentityAuthorityClient`] implements
//! [`identity_authority_sdk::IdentityAuthorityClient`] over the
//! `auth.AuthService/Authenticate` RPC described in `proto/auth.proto`.
//!
//! The client is built once at startup from [`GrpcAuthorityConfig`]; the
//! channel connects lazily and is shared by every request.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod client;
pub mod config;
pub mod proto;

pub use client::{ClientBuildError, GrpcIdentityAuthorityClient};
pub use config::GrpcAuthorityConfig;
