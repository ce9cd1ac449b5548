// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line argument source adapter.
//!
//! This module provides an adapter that reads configuration values from
//! command-line arguments.

use crate::adapters::flat_map::FlatMapSource;
use std::collections::BTreeMap;

/// Source adapter for command-line arguments.
///
/// Supported argument formats:
/// - `--key=value`: Long form with equals sign
/// - `--key value`: Long form with space-separated value
/// - `-k value`: Short form with space-separated value
///
/// Positional arguments are ignored, and when a key is repeated the last
/// value wins.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::CommandLineAdapter;
/// use layercfg::ports::Source;
///
/// let args = vec!["--database.host=localhost", "--database.port", "5432"];
/// let source = CommandLineAdapter::from_args(args).source();
///
/// assert_eq!(source.get_key("database.port").unwrap().to_u16().unwrap(), 5432);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandLineAdapter {
    /// Parsed configuration values
    values: BTreeMap<String, String>,
}

impl CommandLineAdapter {
    /// Creates a new command-line adapter with no arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new command-line adapter from a list of arguments.
    pub fn from_args<S: AsRef<str>>(args: Vec<S>) -> Self {
        let mut adapter = Self::new();
        adapter.parse_args(&args);
        adapter
    }

    /// Creates a new command-line adapter from the process's arguments,
    /// skipping the program name.
    pub fn from_env_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_args(args)
    }

    /// Returns the parsed key-value pairs.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Builds a source over the parsed arguments.
    pub fn source(&self) -> FlatMapSource {
        FlatMapSource::new(self.values.clone()).named("command-line arguments")
    }

    /// Parses command-line arguments and populates the values map.
    fn parse_args<S: AsRef<str>>(&mut self, args: &[S]) {
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_ref();
            let next: Option<&str> = args.get(i + 1).map(|s| s.as_ref());

            if let Some(long) = arg.strip_prefix("--") {
                // --key=value
                if let Some((key, value)) = long.split_once('=') {
                    self.values.insert(key.to_string(), value.to_string());
                    i += 1;
                    continue;
                }
                // --key value
                i += self.take_value(long, next);
            } else if let Some(short) = arg.strip_prefix('-').filter(|s| s.chars().count() == 1) {
                // -k value
                i += self.take_value(short, next);
            } else {
                i += 1;
            }
        }

        tracing::debug!("Parsed {} command-line arguments", self.values.len());
    }

    /// Stores `key` with `next` unless `next` is missing or another flag.
    /// Returns how many arguments were consumed.
    fn take_value(&mut self, key: &str, next: Option<&str>) -> usize {
        match next {
            Some(value) if !value.starts_with('-') => {
                self.values.insert(key.to_string(), value.to_string());
                2
            }
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Source;

    fn value(adapter: &CommandLineAdapter, key: &str) -> Option<String> {
        adapter.values().get(key).cloned()
    }

    #[test]
    fn test_cli_adapter_empty() {
        let adapter = CommandLineAdapter::new();
        assert!(adapter.values().is_empty());
        assert!(!adapter.source().contains_key("test.key"));
    }

    #[test]
    fn test_cli_adapter_long_form_equals() {
        let adapter = CommandLineAdapter::from_args(vec!["--database.host=localhost", "--database.port=5432"]);
        assert_eq!(value(&adapter, "database.host").as_deref(), Some("localhost"));
        assert_eq!(value(&adapter, "database.port").as_deref(), Some("5432"));
    }

    #[test]
    fn test_cli_adapter_long_form_space() {
        let adapter = CommandLineAdapter::from_args(vec!["--host", "localhost", "--port", "8080"]);
        assert_eq!(value(&adapter, "host").as_deref(), Some("localhost"));
        assert_eq!(value(&adapter, "port").as_deref(), Some("8080"));
    }

    #[test]
    fn test_cli_adapter_short_form() {
        let adapter = CommandLineAdapter::from_args(vec!["-h", "localhost", "-p", "8080"]);
        assert_eq!(value(&adapter, "h").as_deref(), Some("localhost"));
        assert_eq!(value(&adapter, "p").as_deref(), Some("8080"));
    }

    #[test]
    fn test_cli_adapter_missing_value() {
        let adapter = CommandLineAdapter::from_args(vec!["--host"]);
        assert_eq!(value(&adapter, "host"), None);
    }

    #[test]
    fn test_cli_adapter_flag_as_value() {
        // --host followed by another flag should not treat the flag as a value
        let adapter = CommandLineAdapter::from_args(vec!["--host", "--port", "8080"]);
        assert_eq!(value(&adapter, "host"), None);
        assert_eq!(value(&adapter, "port").as_deref(), Some("8080"));
    }

    #[test]
    fn test_cli_adapter_equals_in_value() {
        let adapter = CommandLineAdapter::from_args(vec!["--connection-string=host=localhost;port=5432"]);
        assert_eq!(
            value(&adapter, "connection-string").as_deref(),
            Some("host=localhost;port=5432")
        );
    }

    #[test]
    fn test_cli_adapter_empty_value() {
        let adapter = CommandLineAdapter::from_args(vec!["--key="]);
        assert_eq!(value(&adapter, "key").as_deref(), Some(""));
    }

    #[test]
    fn test_cli_adapter_non_flag_arguments() {
        // Non-flag arguments should be ignored
        let adapter = CommandLineAdapter::from_args(vec!["positional1", "--key", "value", "positional2"]);
        assert_eq!(adapter.values().len(), 1);
        assert_eq!(value(&adapter, "key").as_deref(), Some("value"));
    }

    #[test]
    fn test_cli_adapter_override_value() {
        // If the same key appears multiple times, the last value should win
        let adapter = CommandLineAdapter::from_args(vec!["--key=value1", "--key=value2"]);
        assert_eq!(value(&adapter, "key").as_deref(), Some("value2"));
    }

    #[test]
    fn test_cli_source_nests_dotted_keys() {
        let source = CommandLineAdapter::from_args(vec![
            "--network.buffer.size=64",
            "--network.buffer.hosts.0=a",
            "--network.buffer.hosts.1=b",
        ])
        .source();
        assert_eq!(source.description(), "command-line arguments");
        let buffer = source.get_key("network.buffer").unwrap();
        assert_eq!(buffer.get_key("size").unwrap().to_u32().unwrap(), 64);
        assert_eq!(buffer.get_key("hosts").unwrap().to_list().unwrap().len(), 2);
    }
}
