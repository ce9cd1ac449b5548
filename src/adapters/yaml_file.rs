// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML source provider.
//!
//! YAML documents are converted into a [`Value`] tree and exposed through a
//! [`ValueSource`], so scalars keep the type YAML gave them: `port: 8080` is
//! an integer and `name: "8080"` is text.

use crate::adapters::value_source::ValueSource;
use crate::domain::errors::SourceError;
use crate::domain::value::Value;
use crate::ports::{Source, SourceProvider};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum allowed file size for YAML configuration files (10MB)
const MAX_YAML_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Provider for YAML documents.
///
/// Null values are treated as absent: a key mapped to `~` is not contained
/// in the resulting source.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::YamlProvider;
/// use layercfg::ports::{Source, SourceProvider};
///
/// let yaml = "database:\n  host: localhost\n  port: 5432";
/// let source = YamlProvider::new().parse_str(yaml).unwrap();
///
/// assert_eq!(source.get_key("database.host").unwrap().to_text().unwrap(), "localhost");
/// assert_eq!(source.get_key("database.port").unwrap().to_u16().unwrap(), 5432);
/// ```
#[derive(Debug, Clone)]
pub struct YamlProvider {
    max_file_size: u64,
}

impl YamlProvider {
    /// Creates a YAML provider with the default file size limit.
    pub fn new() -> Self {
        YamlProvider {
            max_file_size: MAX_YAML_FILE_SIZE,
        }
    }

    /// Sets the largest file, in bytes, that [`SourceProvider::parse_file`]
    /// will read.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Parses YAML text into a [`Value`] tree.
    ///
    /// An empty document is an empty map.
    pub fn parse_value(&self, content: &str) -> Result<Value, SourceError> {
        let document: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| SourceError::parse_with(format!("Failed to parse YAML: {e}"), e))?;
        Ok(convert(document)?.unwrap_or_else(|| Value::Map(BTreeMap::new())))
    }

    /// Returns the path of `config.yaml` in the OS-appropriate configuration
    /// directory for the application, if one can be determined.
    pub fn default_location(app_name: &str, qualifier: &str) -> Option<PathBuf> {
        Self::location_of(app_name, qualifier, "config.yaml")
    }

    /// Returns the path of `filename` in the OS-appropriate configuration
    /// directory for the application, if one can be determined.
    pub fn location_of(app_name: &str, qualifier: &str, filename: &str) -> Option<PathBuf> {
        ProjectDirs::from(qualifier, "", app_name).map(|dirs| dirs.config_dir().join(filename))
    }

    /// Reads `config.yaml` from the default location.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use layercfg::adapters::YamlProvider;
    ///
    /// let source = YamlProvider::new().parse_default_location("myapp", "com.example").unwrap();
    /// ```
    pub fn parse_default_location(
        &self,
        app_name: &str,
        qualifier: &str,
    ) -> Result<Box<dyn Source>, SourceError> {
        let path = Self::default_location(app_name, qualifier)
            .ok_or_else(|| SourceError::parse("Failed to determine project directories"))?;
        self.parse_file(&path)
    }
}

impl Default for YamlProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceProvider for YamlProvider {
    fn parse_described(&self, content: &str, description: &str) -> Result<Box<dyn Source>, SourceError> {
        let value = self.parse_value(content)?;
        tracing::debug!("Parsed YAML document from {}", description);
        Ok(Box::new(ValueSource::new(value).named(description)))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn parse_file(&self, path: &Path) -> Result<Box<dyn Source>, SourceError> {
        let canonical_path = path.canonicalize()?;

        // Check file size before reading
        let metadata = fs::metadata(&canonical_path)?;
        if metadata.len() > self.max_file_size {
            return Err(SourceError::parse(format!(
                "Configuration file too large: {} bytes (max {} bytes)",
                metadata.len(),
                self.max_file_size
            )));
        }

        let content = fs::read_to_string(&canonical_path)?;
        let description = format!("yaml file {}", canonical_path.display());
        self.parse_described(&content, &description)
    }
}

/// Converts a YAML node, returning `None` for null.
fn convert(value: serde_yaml::Value) -> Result<Option<Value>, SourceError> {
    let converted = match value {
        serde_yaml::Value::Null => return Ok(None),
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_yaml::Value::String(s) => Value::Text(s),
        serde_yaml::Value::Sequence(seq) => {
            let mut values = Vec::with_capacity(seq.len());
            for element in seq {
                if let Some(element) = convert(element)? {
                    values.push(element);
                }
            }
            Value::List(values)
        }
        serde_yaml::Value::Mapping(map) => {
            let mut entries = BTreeMap::new();
            for (key, val) in map {
                let key = match key {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(SourceError::parse(format!(
                            "unsupported YAML map key {other:?}, only scalar keys are supported"
                        )))
                    }
                };
                if let Some(val) = convert(val)? {
                    entries.insert(key, val);
                }
            }
            Value::Map(entries)
        }
        serde_yaml::Value::Tagged(tagged) => return convert(tagged.value),
    };
    Ok(Some(converted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_nested() {
        let yaml = r#"
app:
  database:
    connection:
      host: localhost
      port: 5432
"#;
        let source = YamlProvider::new().parse_str(yaml).unwrap();
        assert_eq!(
            source.get_key("app.database.connection.host").unwrap().to_text().unwrap(),
            "localhost"
        );
        assert!(source.get_key("app.database").unwrap().is_map());
        assert_eq!(source.description(), "yaml string");
    }

    #[test]
    fn test_yaml_array() {
        let yaml = "servers:\n  - server1\n  - server2\n  - server3\n";
        let source = YamlProvider::new().parse_str(yaml).unwrap();
        let servers = source.get_key("servers").unwrap().to_list().unwrap();
        assert_eq!(servers.len(), 3);
        assert_eq!(servers[2].to_text().unwrap(), "server3");
    }

    #[test]
    fn test_yaml_scalar_types_are_kept() {
        let yaml = r#"
string_value: hello
number_value: 42
quoted_number: "42"
float_value: 1.5
bool_value: true
null_value: null
"#;
        let value = YamlProvider::new().parse_value(yaml).unwrap();
        assert_eq!(value.lookup(&["string_value"]), Some(&Value::from("hello")));
        assert_eq!(value.lookup(&["number_value"]), Some(&Value::Int(42)));
        assert_eq!(value.lookup(&["quoted_number"]), Some(&Value::from("42")));
        assert_eq!(value.lookup(&["float_value"]), Some(&Value::Float(1.5)));
        assert_eq!(value.lookup(&["bool_value"]), Some(&Value::Bool(true)));
        assert_eq!(value.lookup(&["null_value"]), None);
    }

    #[test]
    fn test_yaml_numeric_keys() {
        let value = YamlProvider::new().parse_value("codes:\n  200: ok\n  404: missing\n").unwrap();
        assert_eq!(value.lookup(&["codes", "404"]), Some(&Value::from("missing")));
    }

    #[test]
    fn test_yaml_empty_document_is_empty_map() {
        let value = YamlProvider::new().parse_value("").unwrap();
        assert_eq!(value, Value::Map(BTreeMap::new()));
    }

    #[test]
    fn test_yaml_invalid() {
        let result = YamlProvider::new().parse_str("invalid: yaml: content:");
        assert!(matches!(result, Err(SourceError::ParseError { .. })));
    }

    #[test]
    fn test_yaml_supported_extensions() {
        let provider = YamlProvider::default();
        assert_eq!(provider.supported_extensions(), ["yaml", "yml"]);
    }

    #[test]
    fn test_yaml_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "database:\n  host: localhost\n  port: 5432").unwrap();

        let source = YamlProvider::new().parse_file(temp_file.path()).unwrap();
        assert!(source.description().starts_with("yaml file "));
        assert_eq!(source.get_key("database.port").unwrap().to_i64().unwrap(), 5432);
    }

    #[test]
    fn test_yaml_file_too_large() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "key: a value that is longer than the limit").unwrap();

        let error = YamlProvider::new()
            .max_file_size(8)
            .parse_file(temp_file.path())
            .unwrap_err();
        assert!(error.to_string().contains("too large"));
    }

    #[test]
    fn test_yaml_nonexistent_file() {
        let result = YamlProvider::new().parse_file(Path::new("/nonexistent/path/to/config.yaml"));
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[test]
    fn test_default_location_ends_with_file_name() {
        if let Some(path) = YamlProvider::default_location("layercfg-test", "com.example") {
            assert!(path.ends_with("config.yaml"));
        }
    }
}
