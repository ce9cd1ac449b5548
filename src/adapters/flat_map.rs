// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source over a flat map of dotted keys to strings.
//!
//! This is the shape of properties files, environment variables and command
//! line arguments. Nested maps are implied by the dots in the keys, and a
//! list is a node whose children are named `0`, `1`, `2`, ... Scalar text is
//! parsed on demand into booleans and numbers.

use crate::domain::errors::SourceError;
use crate::domain::value::parse_bool;
use crate::ports::source::wrong_type;
use crate::ports::Source;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A source over string values addressed by dotted keys.
///
/// Sub-sources share the underlying map.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::FlatMapSource;
/// use layercfg::ports::Source;
///
/// let source = FlatMapSource::new([
///     ("server.port", "8080"),
///     ("server.hosts.0", "a"),
///     ("server.hosts.1", "b"),
/// ]);
///
/// assert_eq!(source.get_key("server.port").unwrap().to_i32().unwrap(), 8080);
/// assert_eq!(source.get_key("server.hosts").unwrap().to_list().unwrap().len(), 2);
/// assert!(source.get_key("server").unwrap().is_map());
/// ```
#[derive(Clone, Debug)]
pub struct FlatMapSource {
    entries: Arc<BTreeMap<String, String>>,
    prefix: String,
    description: String,
}

impl FlatMapSource {
    /// Creates a source from `(key, value)` pairs.
    pub fn new<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        FlatMapSource {
            entries: Arc::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
            prefix: String::new(),
            description: "flat map".to_string(),
        }
    }

    /// Sets the description used in diagnostics.
    pub fn named(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the key prefix this sub-source is rooted at.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the number of entries in the underlying map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the underlying map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn full_key(&self, path: &[String]) -> String {
        if self.prefix.is_empty() {
            path.join(".")
        } else {
            format!("{}.{}", self.prefix, path.join("."))
        }
    }

    fn has_children(&self, key: &str) -> bool {
        let child_prefix = if key.is_empty() {
            String::new()
        } else {
            format!("{key}.")
        };
        self.entries
            .range(child_prefix.clone()..)
            .next()
            .is_some_and(|(candidate, _)| {
                candidate.starts_with(&child_prefix) && candidate.len() > child_prefix.len()
            })
    }

    fn child_names(&self) -> Vec<String> {
        let child_prefix = if self.prefix.is_empty() {
            String::new()
        } else {
            format!("{}.", self.prefix)
        };
        let mut names: Vec<String> = self
            .entries
            .range(child_prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&child_prefix))
            .filter_map(|(key, _)| {
                let rest = &key[child_prefix.len()..];
                let name = rest.split('.').next().unwrap_or(rest);
                (!name.is_empty()).then(|| name.to_string())
            })
            .collect();
        names.dedup();
        names
    }

    fn sub_source(&self, key: String) -> FlatMapSource {
        FlatMapSource {
            entries: Arc::clone(&self.entries),
            prefix: key,
            description: self.description.clone(),
        }
    }

    fn value(&self) -> Result<&str, SourceError> {
        self.entries
            .get(&self.prefix)
            .map(String::as_str)
            .ok_or_else(|| wrong_type(self, "text"))
    }

    fn parse_value<T: std::str::FromStr>(&self, target: &str) -> Result<T, SourceError>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let value = self.value()?;
        value
            .trim()
            .parse::<T>()
            .map_err(|e| SourceError::parse_with(format!("{value} cannot be parsed to {target}"), e))
    }
}

impl Source for FlatMapSource {
    fn description(&self) -> String {
        if self.prefix.is_empty() {
            self.description.clone()
        } else {
            format!("{} at {}", self.description, self.prefix)
        }
    }

    fn kind(&self) -> &'static str {
        if self.is_text() {
            "text"
        } else if self.is_list() {
            "list"
        } else {
            "map"
        }
    }

    fn contains(&self, path: &[String]) -> bool {
        if path.is_empty() {
            return true;
        }
        let key = self.full_key(path);
        self.entries.contains_key(&key) || self.has_children(&key)
    }

    fn get_or_none(&self, path: &[String]) -> Option<Box<dyn Source>> {
        if path.is_empty() {
            return Some(Box::new(self.clone()));
        }
        self.contains(path)
            .then(|| Box::new(self.sub_source(self.full_key(path))) as Box<dyn Source>)
    }

    fn is_list(&self) -> bool {
        self.contains(&["0".to_string()])
    }

    fn is_map(&self) -> bool {
        self.has_children(&self.prefix)
    }

    fn is_text(&self) -> bool {
        self.entries.contains_key(&self.prefix)
    }

    fn to_list(&self) -> Result<Vec<Box<dyn Source>>, SourceError> {
        if !self.is_list() {
            return Err(wrong_type(self, "list"));
        }
        Ok((0usize..)
            .map(|index| self.get_or_none(&[index.to_string()]))
            .take_while(Option::is_some)
            .flatten()
            .collect())
    }

    fn to_map(&self) -> Result<BTreeMap<String, Box<dyn Source>>, SourceError> {
        if !self.is_map() {
            return Err(wrong_type(self, "map"));
        }
        Ok(self
            .child_names()
            .into_iter()
            .map(|name| {
                let source = self.sub_source(self.full_key(std::slice::from_ref(&name)));
                (name, Box::new(source) as Box<dyn Source>)
            })
            .collect())
    }

    fn to_text(&self) -> Result<String, SourceError> {
        self.value().map(str::to_string)
    }

    fn to_bool(&self) -> Result<bool, SourceError> {
        let value = self.value()?;
        parse_bool(value)
            .ok_or_else(|| SourceError::parse(format!("{value} cannot be parsed to a boolean")))
    }

    fn to_i64(&self) -> Result<i64, SourceError> {
        self.parse_value("a long")
    }

    fn to_f64(&self) -> Result<f64, SourceError> {
        self.parse_value("a double")
    }

    fn to_u64(&self) -> Result<u64, SourceError> {
        self.parse_value("an unsigned long")
    }

    fn to_i128(&self) -> Result<i128, SourceError> {
        self.parse_value("a 128-bit integer")
    }
}
