use secrecy::{ExposeSecret, SecretString};

/// Opaque bearer credential extracted from an inbound request.
///
/// No structure is assumed: the value is forwarded verbatim to the identity
/// authority. Wrapped in `SecretString` so `Debug` redacts it.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw credential value.
    ///
    /// Returns `None` when the value is empty or whitespace-only, which the
    /// guard treats the same as an absent credential. Any other value is kept
    /// byte for byte, surrounding whitespace included.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::from(raw.to_owned())))
    }

    /// The raw credential value, for forwarding to the identity authority only.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_and_blank_values_are_absent() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert!(Credential::new("\t\n").is_none());
    }

    #[test]
    fn value_is_kept_verbatim() {
        let credential = Credential::new("  eyJhbGciOi.payload.sig ").unwrap();
        assert_eq!(credential.expose(), "  eyJhbGciOi.payload.sig ");

        let inner = Credential::new("tok A\t").unwrap();
        assert_eq!(inner.expose(), "tok A\t");
    }

    #[test]
    #[allow(clippy::use_debug)]
    fn debug_output_is_redacted() {
        let credential = Credential::new("tok-A").unwrap();
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("tok-A"));
        assert!(rendered.contains("REDACTED"));
    }
}
