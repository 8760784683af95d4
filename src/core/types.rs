//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`EntityName`] - Validated plugin name with case-insensitive identity
//! - [`Version`] - Dotted version string with segment-wise ordering
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use metalist::core::types::{EntityName, Version};
//!
//! let name = EntityName::new("Unofficial Patch.esp").unwrap();
//! assert!(name.matches("unofficial patch.esp"));
//!
//! assert!(Version::new("1.2.10") > Version::new("1.2.9"));
//!
//! // Invalid constructions fail at creation time
//! assert!(EntityName::new("").is_err());
//! assert!(EntityName::new("nested/path.esp").is_err());
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid entity name: {0}")]
    InvalidEntityName(String),
}

/// A validated plugin name.
///
/// Entity names identify files within a single data directory:
/// - Cannot be empty
/// - Cannot contain path separators (`/` or `\`)
/// - Cannot contain ASCII control characters
/// - Cannot be `.` or `..`
///
/// Identity is case-insensitive: `Foo.esp` and `foo.esp` name the same
/// entity. Equality and hashing use the original spelling; use
/// [`EntityName::matches`] or [`EntityName::normalized`] for identity
/// comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityName(String);

impl EntityName {
    /// Create a new validated entity name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidEntityName` if the name is empty, contains
    /// a path separator or control character, or is a dot directory.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        if name.is_empty() {
            return Err(TypeError::InvalidEntityName(
                "entity name cannot be empty".into(),
            ));
        }

        if name == "." || name == ".." {
            return Err(TypeError::InvalidEntityName(
                "entity name cannot be a dot directory".into(),
            ));
        }

        if name.contains('/') || name.contains('\\') {
            return Err(TypeError::InvalidEntityName(
                "entity name cannot contain path separators".into(),
            ));
        }

        if name.chars().any(|c| c.is_ascii_control()) {
            return Err(TypeError::InvalidEntityName(
                "entity name cannot contain control characters".into(),
            ));
        }

        Ok(())
    }

    /// Get the name as a string slice, original spelling preserved.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive identity comparison against a raw string.
    pub fn matches(&self, other: &str) -> bool {
        self.normalized() == other.to_lowercase()
    }

    /// The lowercased form used for identity and uniqueness checks.
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for EntityName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityName> for String {
    fn from(name: EntityName) -> Self {
        name.0
    }
}

/// A dotted version string with segment-wise ordering.
///
/// Segments are compared numerically where both sides parse as integers and
/// lexicographically otherwise. Missing trailing segments compare as zero,
/// so `1.2` equals `1.2.0`.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
}

impl Version {
    /// Wrap a raw version string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Get the raw version string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn segments(&self) -> Vec<&str> {
        self.raw.split(['.', '-']).collect()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.segments();
        let rhs = other.segments();
        let len = lhs.len().max(rhs.len());

        for i in 0..len {
            let a = lhs.get(i).copied().unwrap_or("0");
            let b = rhs.get(i).copied().unwrap_or("0");

            let ord = match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            };

            if ord != Ordering::Equal {
                return ord;
            }
        }

        Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_entity_names() {
        assert!(EntityName::new("Foo.esp").is_ok());
        assert!(EntityName::new("Unofficial Patch.esm").is_ok());
        assert!(EntityName::new("über-mod.esp").is_ok());
    }

    #[test]
    fn invalid_entity_names() {
        assert!(EntityName::new("").is_err());
        assert!(EntityName::new(".").is_err());
        assert!(EntityName::new("..").is_err());
        assert!(EntityName::new("a/b.esp").is_err());
        assert!(EntityName::new("a\\b.esp").is_err());
        assert!(EntityName::new("bad\x07name").is_err());
    }

    #[test]
    fn name_identity_is_case_insensitive() {
        let name = EntityName::new("Foo.esp").unwrap();
        assert!(name.matches("FOO.ESP"));
        assert!(name.matches("foo.esp"));
        assert!(!name.matches("bar.esp"));
    }

    #[test]
    fn name_preserves_original_spelling() {
        let name = EntityName::new("MixedCase.esp").unwrap();
        assert_eq!(name.as_str(), "MixedCase.esp");
        assert_eq!(name.normalized(), "mixedcase.esp");
    }

    #[test]
    fn name_serde_roundtrip() {
        let name = EntityName::new("Foo.esp").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Foo.esp\"");
        let back: EntityName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn name_serde_rejects_invalid() {
        let result: Result<EntityName, _> = serde_json::from_str("\"a/b\"");
        assert!(result.is_err());
    }

    #[test]
    fn version_numeric_ordering() {
        assert!(Version::new("1.2.10") > Version::new("1.2.9"));
        assert!(Version::new("0.9") < Version::new("1.0"));
        assert_eq!(Version::new("1.2"), Version::new("1.2"));
    }

    #[test]
    fn version_missing_segments_are_zero() {
        assert_eq!(Version::new("1.2"), Version::new("1.2.0"));
        assert!(Version::new("1.2.1") > Version::new("1.2"));
    }

    #[test]
    fn version_non_numeric_segments_compare_lexically() {
        assert!(Version::new("1.0-beta") < Version::new("1.0-rc"));
    }
}
