// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dotted configuration paths.
//!
//! A `ConfigPath` is the segment list behind an item name such as
//! `network.buffer.size`. Item paths never contain empty segments; source
//! lookups use the more lenient [`split_key`].

use crate::domain::errors::RegistrationError;
use std::fmt;

/// A dotted path split into its segments.
///
/// # Examples
///
/// ```
/// use layercfg::domain::config_path::ConfigPath;
///
/// let path = ConfigPath::parse("network.buffer.size").unwrap();
/// assert_eq!(path.segments(), ["network", "buffer", "size"]);
/// assert_eq!(path.name(), "network.buffer.size");
///
/// assert!(ConfigPath::parse("network..size").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    /// Parses a dotted item name, rejecting empty segments.
    pub fn parse(name: &str) -> Result<Self, RegistrationError> {
        let segments: Vec<String> = name.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(RegistrationError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(ConfigPath(segments))
    }

    /// Returns the path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Joins the segments back into a dotted name.
    pub fn name(&self) -> String {
        self.0.join(".")
    }
}

impl AsRef<[String]> for ConfigPath {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

impl From<ConfigPath> for Vec<String> {
    fn from(path: ConfigPath) -> Self {
        path.0
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Splits a source key into path segments.
///
/// The empty key addresses the root of a source and yields an empty path.
/// Unlike [`ConfigPath::parse`] this never fails.
pub fn split_key(key: &str) -> Vec<String> {
    if key.is_empty() {
        Vec::new()
    } else {
        key.split('.').map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_simple_name() {
        let path = ConfigPath::parse("size").unwrap();
        assert_eq!(path.segments(), ["size"]);
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        for name in ["", ".a", "a.", "a..b"] {
            let result = ConfigPath::parse(name);
            assert!(
                matches!(result, Err(RegistrationError::InvalidName { .. })),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_and_name() {
        let path = ConfigPath::parse("a.b.c").unwrap();
        assert_eq!(path.to_string(), "a.b.c");
        assert_eq!(path.name(), "a.b.c");
    }

    #[test]
    fn test_hash_and_eq() {
        let mut set = HashSet::new();
        set.insert(ConfigPath::parse("a.b").unwrap());
        assert!(set.contains(&ConfigPath::parse("a.b").unwrap()));
        assert!(!set.contains(&ConfigPath::parse("a.b.c").unwrap()));
    }

    #[test]
    fn test_split_key() {
        assert!(split_key("").is_empty());
        assert_eq!(split_key("a.b"), vec!["a", "b"]);
    }
}
