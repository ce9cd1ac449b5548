// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source over a flat map of dotted keys to values.

use crate::adapters::value_source::ValueSource;
use crate::domain::errors::SourceError;
use crate::domain::value::Value;
use crate::ports::Source;
use std::collections::BTreeMap;

/// A source whose keys are full dotted paths.
///
/// Only exact keys are found: `a.b` does not make `a` a map.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::KvSource;
/// use layercfg::ports::Source;
///
/// let source = KvSource::new([("network.buffer.size", 1024)]);
/// assert!(source.contains_key("network.buffer.size"));
/// assert!(!source.contains_key("network.buffer"));
/// ```
#[derive(Clone, Debug)]
pub struct KvSource {
    entries: BTreeMap<String, Value>,
    description: String,
}

impl KvSource {
    /// Creates a source from `(key, value)` pairs.
    pub fn new<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        KvSource {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            description: "key-value map".to_string(),
        }
    }

    /// Sets the description used in diagnostics.
    pub fn named(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the entries.
    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }
}

impl Source for KvSource {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn kind(&self) -> &'static str {
        "map"
    }

    fn get_or_none(&self, path: &[String]) -> Option<Box<dyn Source>> {
        if path.is_empty() {
            return Some(Box::new(self.clone()));
        }
        let key = path.join(".");
        self.entries.get(&key).map(|value| {
            Box::new(ValueSource::new(value.clone()).named(format!("{} at {}", self.description, key)))
                as Box<dyn Source>
        })
    }

    fn is_map(&self) -> bool {
        true
    }

    fn to_map(&self) -> Result<BTreeMap<String, Box<dyn Source>>, SourceError> {
        Ok(self
            .entries
            .iter()
            .map(|(key, value)| {
                let source = ValueSource::new(value.clone())
                    .named(format!("{} at {}", self.description, key));
                (key.clone(), Box::new(source) as Box<dyn Source>)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_keys_only() {
        let source = KvSource::new([("a.b.c", 1)]);
        assert!(source.contains_key("a.b.c"));
        assert!(!source.contains_key("a.b"));
        assert!(source.get_key("a").is_err());
    }

    #[test]
    fn test_values_keep_their_kind() {
        let source = KvSource::new([("flag", Value::from(true)), ("name", Value::from("x"))]);
        assert!(source.get_key("flag").unwrap().to_bool().unwrap());
        assert!(source.get_key("name").unwrap().to_bool().is_err());
    }

    #[test]
    fn test_to_map() {
        let source = KvSource::new([("a", 1), ("b", 2)]);
        let map = source.to_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["b"].to_i64().unwrap(), 2);
    }
}
