//! Redacting wrapper for credentials
//!
//! The API access token travels through the CLI, the config layer and the
//! HTTP client wrapped in `Sensitive`, so formatting it anywhere (a log
//! field, a `Debug` dump of a client) prints a placeholder instead.

use std::fmt;

/// Placeholder printed instead of the wrapped value
pub const REDACTED: &str = "***REDACTED***";

/// A value that never formats itself
///
/// ```
/// use mrsnap_core_types::Sensitive;
///
/// let token = Sensitive::new("0123abcd");
/// assert_eq!(format!("{:?} {}", token, token), "***REDACTED*** ***REDACTED***");
/// assert_eq!(token.expose(), &"0123abcd");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the secret; only the request builder should need this
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl Sensitive<String> {
    /// Wrap a token, treating blank input as no token at all
    pub fn non_empty(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_never_leaks() {
        let token = Sensitive::new("gitee-token-1");
        assert_eq!(format!("{:?}", token), REDACTED);
        assert_eq!(token.to_string(), REDACTED);
        assert_eq!(format!("{:>20}", token), REDACTED);
    }

    #[test]
    fn test_non_empty_rejects_blank_tokens() {
        assert!(Sensitive::non_empty("").is_none());
        assert!(Sensitive::non_empty("  \n").is_none());
        assert_eq!(
            Sensitive::non_empty("tok").map(Sensitive::into_inner),
            Some("tok".to_string())
        );
    }

    #[test]
    fn test_redacted_inside_derived_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Client {
            organization: String,
            token: Sensitive<String>,
        }

        let client = Client {
            organization: "openharmony".to_string(),
            token: "secret123".to_string().into(),
        };

        let dump = format!("{:?}", client);
        assert!(dump.contains("openharmony"));
        assert!(!dump.contains("secret123"));
    }
}
