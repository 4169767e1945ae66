//! Element keys.
//!
//! A key is a small opaque string a host assigns to a DOM element when it
//! resolves a selector, e.g. `"reveal-0/3"`. Keys must be non-empty and free of
//! whitespace so they can round-trip through `data-*` attributes.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("element key is empty")]
    Empty,
    #[error("element key contains whitespace: {0:?}")]
    Whitespace(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(String);

impl ElementKey {
    /// Build a key without validation. Hosts that generate keys themselves use this.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Parse a key coming from untrusted input (JSON, DOM attributes).
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        if s.is_empty() {
            return Err(KeyError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(KeyError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ElementKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementKey::parse(s)
    }
}

impl From<&str> for ElementKey {
    fn from(s: &str) -> Self {
        ElementKey::new(s)
    }
}

impl Serialize for ElementKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ElementKey {
    fn deserialize<D>(deserializer: D) -> Result<ElementKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ElementKey::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert_eq!(ElementKey::parse(""), Err(KeyError::Empty));
        assert!(matches!(
            ElementKey::parse("hero canvas"),
            Err(KeyError::Whitespace(_))
        ));
        assert_eq!(ElementKey::parse("counter-0/2").unwrap().as_str(), "counter-0/2");
    }

    #[test]
    fn deserialize_validates() {
        let ok: ElementKey = serde_json::from_str("\"nav\"").unwrap();
        assert_eq!(ok, ElementKey::new("nav"));
        assert!(serde_json::from_str::<ElementKey>("\"\"").is_err());
    }
}
