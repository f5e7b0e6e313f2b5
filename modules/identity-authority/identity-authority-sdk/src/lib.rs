//! Identity authority SDK
//!
//! This crate provides the contract every Sleepr service uses to delegate
//! credential verification to the identity authority:
//!
//! - [`IdentityAuthorityClient`] - client trait implemented by the RPC stub
//!   and by in-process authorities
//! - [`AuthFailure`] - failure taxonomy for an `authenticate` call
//!
//! ## Usage
//!
//! The client is constructed once at service startup and handed to the guard:
//!
//! ```ignore
//! use identity_authority_sdk::IdentityAuthorityClient;
//!
//! let authority: Arc<dyn IdentityAuthorityClient> = Arc::new(grpc_client);
//! let identity = authority.authenticate(&credential).await?;
//! ```

pub mod api;
pub mod error;

pub use api::IdentityAuthorityClient;
pub use error::AuthFailure;
