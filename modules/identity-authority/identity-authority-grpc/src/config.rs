//! Configuration for the identity authority gRPC client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_endpoint() -> String {
    "http://127.0.0.1:50051".to_owned()
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> u64 {
    3_000
}

/// Where and how to reach the identity authority.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GrpcAuthorityConfig {
    /// Authority URI, e.g. `http://auth:50051`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Upper bound on establishing the connection.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Deadline for a single `Authenticate` call, sent as `grpc-timeout`.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for GrpcAuthorityConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl GrpcAuthorityConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg: GrpcAuthorityConfig =
            serde_json::from_value(serde_json::json!({ "endpoint": "http://auth:50051" })).unwrap();

        assert_eq!(cfg.endpoint, "http://auth:50051");
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(3));
    }
}
