use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum allowed length for a [`ResourceKey`].
const RESOURCE_KEY_MAX_LEN: usize = 128;

/// Errors from constructing a [`ResourceKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceKeyError {
    /// The input was empty or contained only whitespace.
    #[error("resource uuid cannot be empty or whitespace")]
    Empty,
    /// The key contains whitespace, `/` or control characters.
    #[error("resource uuid contains invalid characters: {0:?}")]
    InvalidCharacters(String),
    /// The key exceeds [`RESOURCE_KEY_MAX_LEN`] characters.
    #[error("resource uuid exceeds maximum length of {RESOURCE_KEY_MAX_LEN} characters")]
    TooLong,
}

/// The natural key of a catalog resource (its `uuid`).
///
/// Callers may supply any opaque token (`"r1"` is as valid as a canonical
/// UUID); when none is supplied the service generates a v4 UUID string.
/// The key is also the identity the per-resource operation lock is taken on.
///
/// # Examples
///
/// ```
/// use geocat_core::ResourceKey;
///
/// let key = ResourceKey::new(" r1 ").unwrap();
/// assert_eq!(key.as_str(), "r1");
/// assert!(ResourceKey::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Create a new key, trimming surrounding whitespace and validating the rest.
    pub fn new(raw: &str) -> Result<Self, ResourceKeyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ResourceKeyError::Empty);
        }
        if trimmed.chars().count() > RESOURCE_KEY_MAX_LEN {
            return Err(ResourceKeyError::TooLong);
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '/')
        {
            return Err(ResourceKeyError::InvalidCharacters(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generate a fresh key from a random v4 UUID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Return the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceKey {
    type Err = ResourceKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = ResourceKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("r1", "r1")]
    #[case("  padded  ", "padded")]
    #[case("550e8400-e29b-41d4-a716-446655440000", "550e8400-e29b-41d4-a716-446655440000")]
    fn valid_keys(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(ResourceKey::new(raw).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("", ResourceKeyError::Empty)]
    #[case("   ", ResourceKeyError::Empty)]
    #[case("a b", ResourceKeyError::InvalidCharacters("a b".into()))]
    #[case("a/b", ResourceKeyError::InvalidCharacters("a/b".into()))]
    fn invalid_keys(#[case] raw: &str, #[case] expected: ResourceKeyError) {
        assert_eq!(ResourceKey::new(raw).unwrap_err(), expected);
    }

    #[test]
    fn too_long_key_is_rejected() {
        let raw = "x".repeat(RESOURCE_KEY_MAX_LEN + 1);
        assert_eq!(ResourceKey::new(&raw).unwrap_err(), ResourceKeyError::TooLong);
    }

    #[test]
    fn generated_keys_parse_as_uuid() {
        let key = ResourceKey::generate();
        assert!(uuid::Uuid::parse_str(key.as_str()).is_ok());
    }

    #[test]
    fn serde_rejects_invalid_key() {
        assert!(serde_json::from_str::<ResourceKey>("\"\"").is_err());
        let key: ResourceKey = serde_json::from_str("\"r1\"").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"r1\"");
    }
}
