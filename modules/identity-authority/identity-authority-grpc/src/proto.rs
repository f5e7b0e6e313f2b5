//! Wire messages for `auth.AuthService`.
//!
//! Maintained by hand to match `proto/auth.proto`; keep field tags in sync.

macro_rules! auth_service {
    () => {
        "auth.AuthService"
    };
}

/// Fully qualified gRPC service name.
pub const AUTH_SERVICE_NAME: &str = auth_service!();

/// Path of the `Authenticate` method.
pub const AUTHENTICATE_PATH: &str = concat!("/", auth_service!(), "/Authenticate");

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct AuthenticateRequest {
    /// Raw credential, forwarded verbatim.
    #[prost(string, tag = "1")]
    pub authentication: String,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct RoleMessage {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct UserMessage {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(message, repeated, tag = "3")]
    pub roles: Vec<RoleMessage>,
}
