use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque credential authorizing a publish against network storage costs.
///
/// FLB never inspects the token; it is forwarded verbatim to the node.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp(String);

impl Stamp {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Tokens are credentials; keep them out of logs.
        write!(f, "Stamp(<redacted>)")
    }
}

impl From<&str> for Stamp {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Stamp {
    fn from(token: String) -> Self {
        Self(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_token() {
        let s = Stamp::new("abc123");
        assert_eq!(s.as_str(), "abc123");
    }

    #[test]
    fn debug_redacts_token() {
        let s = Stamp::new("secret");
        let debug = format!("{s:?}");
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn serde_roundtrip() {
        let s = Stamp::new("tok");
        let json = serde_json::to_string(&s).unwrap();
        let parsed: Stamp = serde_json::from_str(&json).unwrap();
        assert_eq!(s, parsed);
    }
}
