//! Identity - stable 128-bit identifiers for actors

use crate::error::InvalidIdentityError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Globally unique, immutable identifier of an actor (e.g. a player).
///
/// Display names are resolved separately and may change; the identity never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    /// Wrap an existing UUID
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Build an identity from its raw 128-bit value
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Generate a random identity
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity literal, accepting hyphenated and simple forms
    pub fn parse(literal: &str) -> Result<Self, InvalidIdentityError> {
        Uuid::parse_str(literal.trim())
            .map(Self)
            .map_err(|_| InvalidIdentityError {
                literal: literal.to_string(),
            })
    }

    /// Check whether a string is syntactically an identity literal
    pub fn is_literal(candidate: &str) -> bool {
        Self::parse(candidate).is_ok()
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identity {
    type Err = InvalidIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============== Parsing Tests ==============

    #[test]
    fn test_parse_hyphenated() {
        let id = Identity::parse("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap();
        assert_eq!(id.to_string(), "069a79f4-44e9-4726-a5be-fca90e38aaf5");
    }

    #[test]
    fn test_parse_simple_form_normalizes() {
        let id = Identity::parse("069A79F444E94726A5BEFCA90E38AAF5").unwrap();
        assert_eq!(id.to_string(), "069a79f4-44e9-4726-a5be-fca90e38aaf5");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(Identity::parse("  069a79f4-44e9-4726-a5be-fca90e38aaf5 ").is_ok());
    }

    #[test]
    fn test_parse_rejects_names() {
        let err = Identity::parse("Notch").unwrap_err();
        assert_eq!(err.literal, "Notch");
        assert!(err.to_string().contains("Notch"));
    }

    #[test]
    fn test_is_literal() {
        assert!(Identity::is_literal("00000000-0000-0000-0000-000000000001"));
        assert!(!Identity::is_literal(""));
        assert!(!Identity::is_literal("jeb_"));
    }

    // ============== Ordering / Serde Tests ==============

    #[test]
    fn test_ordering_follows_raw_value() {
        assert!(Identity::from_u128(1) < Identity::from_u128(2));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = Identity::from_u128(1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000001\"");

        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
