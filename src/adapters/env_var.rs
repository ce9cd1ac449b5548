// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable source adapter.
//!
//! This module provides an adapter that snapshots environment variables into
//! a [`FlatMapSource`].

use crate::adapters::flat_map::FlatMapSource;
use std::collections::BTreeMap;
use std::env;

/// Maximum length for environment variable keys
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Source adapter for environment variables.
///
/// The adapter supports optional prefix filtering (e.g., only read variables
/// starting with `APP_`) and key transformation, so that `APP_SERVER_PORT`
/// can be addressed as `server.port`.
///
/// The environment is read when [`EnvVarAdapter::source`] is called; later
/// changes to the process environment are not seen by a source that has
/// already been built.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::EnvVarAdapter;
/// use layercfg::ports::Source;
///
/// let source = EnvVarAdapter::with_values([("APP_SERVER_PORT", "8080")])
///     .prefix("APP_")
///     .lowercase_keys(true)
///     .source();
///
/// assert_eq!(source.get_key("server.port").unwrap().to_u16().unwrap(), 8080);
/// ```
#[derive(Debug, Clone)]
pub struct EnvVarAdapter {
    /// Optional prefix to filter environment variables
    prefix: Option<String>,
    /// Whether to convert keys to lowercase
    lowercase_keys: bool,
    /// Whether to replace underscores with dots
    replace_underscores: bool,
    /// Fixed variables used instead of the process environment
    values: Option<Vec<(String, String)>>,
}

impl EnvVarAdapter {
    /// Creates a new environment variable adapter without prefix filtering.
    ///
    /// Underscores are replaced with dots; case is kept.
    pub fn new() -> Self {
        Self {
            prefix: None,
            lowercase_keys: false,
            replace_underscores: true,
            values: None,
        }
    }

    /// Creates an adapter that only reads variables starting with `prefix`.
    ///
    /// The prefix is stripped and keys are lowercased, so `APP_SERVER_PORT`
    /// with prefix `APP_` becomes `server.port`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new().prefix(prefix).lowercase_keys(true)
    }

    /// Creates an adapter over fixed variables instead of the process
    /// environment.
    ///
    /// The same filtering and key transformations apply.
    pub fn with_values<K, V, I>(values: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            values: Some(
                values
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
            ..Self::new()
        }
    }

    /// Sets the prefix used to filter variables.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets whether to convert keys to lowercase.
    pub fn lowercase_keys(mut self, enabled: bool) -> Self {
        self.lowercase_keys = enabled;
        self
    }

    /// Sets whether to replace underscores with dots in keys.
    pub fn replace_underscores(mut self, enabled: bool) -> Self {
        self.replace_underscores = enabled;
        self
    }

    /// Reads the variables and applies filtering and key transformations.
    pub fn load(&self) -> BTreeMap<String, String> {
        let vars: Box<dyn Iterator<Item = (String, String)> + '_> = match &self.values {
            Some(values) => Box::new(values.iter().cloned()),
            None => Box::new(env::vars()),
        };

        let mut entries = BTreeMap::new();
        for (key, value) in vars {
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={} (max key={}, max value={})",
                    key.len(),
                    value.len(),
                    MAX_ENV_KEY_LEN,
                    MAX_ENV_VALUE_LEN
                );
                continue;
            }
            if let Some(key) = self.transform_key(&key) {
                entries.insert(key, value);
            }
        }

        tracing::debug!(
            "Loaded {} environment variables (prefix={:?}, lowercase={}, replace_underscores={})",
            entries.len(),
            self.prefix,
            self.lowercase_keys,
            self.replace_underscores
        );

        entries
    }

    /// Snapshots the variables into a source.
    pub fn source(&self) -> FlatMapSource {
        let description = match &self.prefix {
            Some(prefix) => format!("environment variables ({prefix}*)"),
            None => "environment variables".to_string(),
        };
        FlatMapSource::new(self.load()).named(description)
    }

    fn transform_key(&self, key: &str) -> Option<String> {
        let key = match &self.prefix {
            Some(prefix) => key.strip_prefix(prefix.as_str())?,
            None => key,
        };
        if key.is_empty() {
            return None;
        }
        let mut transformed = key.to_string();
        if self.lowercase_keys {
            transformed = transformed.to_lowercase();
        }
        if self.replace_underscores {
            transformed = transformed.replace('_', ".");
        }
        Some(transformed)
    }
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}
