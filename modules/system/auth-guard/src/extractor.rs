//! Credential extraction from inbound request headers.

use axum::http::{HeaderMap, HeaderName, header};
use serde::{Deserialize, Serialize};
use sleepr_security::Credential;
use tower_cookies::Cookie;

/// A place a credential may be carried on the request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialSource {
    /// Named cookie, e.g. `Authentication=<jwt>`.
    Cookie { name: String },
    /// `Authorization: Bearer <token>`.
    Authorization,
    /// Arbitrary named header carrying the raw credential.
    Header { name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("invalid credential header name '{0}'")]
    InvalidHeaderName(String),
    #[error("at least one credential source must be configured")]
    NoSources,
}

#[derive(Debug, Clone)]
enum Source {
    Cookie(String),
    Authorization,
    Header(HeaderName),
}

/// Pulls the credential out of a request. Performs no validation of the
/// credential itself.
#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    sources: Vec<Source>,
}

impl CredentialExtractor {
    /// # Errors
    ///
    /// Returns an error if `sources` is empty or a header name is invalid.
    pub fn new(sources: &[CredentialSource]) -> Result<Self, ExtractorError> {
        if sources.is_empty() {
            return Err(ExtractorError::NoSources);
        }

        let sources = sources
            .iter()
            .map(|s| match s {
                CredentialSource::Cookie { name } => Ok(Source::Cookie(name.clone())),
                CredentialSource::Authorization => Ok(Source::Authorization),
                CredentialSource::Header { name } => HeaderName::from_bytes(name.as_bytes())
                    .map(Source::Header)
                    .map_err(|_| ExtractorError::InvalidHeaderName(name.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { sources })
    }

    /// First non-empty credential found, in configured source order.
    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> Option<Credential> {
        self.sources.iter().find_map(|source| {
            let raw = match source {
                Source::Cookie(name) => cookie_value(headers, name),
                Source::Authorization => bearer_token(headers),
                Source::Header(name) => headers.get(name).and_then(|v| v.to_str().ok()),
            };
            raw.and_then(Credential::new)
        })
    }
}

impl Default for CredentialExtractor {
    fn default() -> Self {
        Self {
            sources: vec![
                Source::Cookie("Authentication".to_owned()),
                Source::Authorization,
            ],
        }
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .and_then(|c| c.value_raw())
}

/// Extract Bearer token from Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
}
