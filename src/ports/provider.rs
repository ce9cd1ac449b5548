// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source provider trait definition.
//!
//! A `SourceProvider` turns raw document content in one format into a
//! [`Source`]. Format-specific providers only implement
//! [`SourceProvider::parse_described`]; reading from bytes, readers and files
//! is shared.

use crate::domain::errors::SourceError;
use crate::ports::Source;
use std::fs;
use std::io::Read;
use std::path::Path;

/// A parser that produces [`Source`]s from documents in one format.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::FlatMapSource;
/// use layercfg::domain::SourceError;
/// use layercfg::ports::{Source, SourceProvider};
///
/// /// Reads `key=value` lines.
/// struct LinesProvider;
///
/// impl SourceProvider for LinesProvider {
///     fn parse_described(
///         &self,
///         content: &str,
///         description: &str,
///     ) -> Result<Box<dyn Source>, SourceError> {
///         let entries = content
///             .lines()
///             .filter_map(|line| line.split_once('='))
///             .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()));
///         Ok(Box::new(FlatMapSource::new(entries).named(description)))
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["lines"]
///     }
/// }
///
/// let source = LinesProvider.parse_str("server.port = 8080").unwrap();
/// assert_eq!(source.get_key("server.port").unwrap().to_u16().unwrap(), 8080);
/// ```
pub trait SourceProvider {
    /// Parses `content`, labelling the resulting source with `description`.
    fn parse_described(&self, content: &str, description: &str) -> Result<Box<dyn Source>, SourceError>;

    /// Returns the file extensions (without the dot) handled by this provider.
    fn supported_extensions(&self) -> &[&str];

    /// Parses a document held in a string.
    fn parse_str(&self, content: &str) -> Result<Box<dyn Source>, SourceError> {
        let description = format!("{} string", self.format_name());
        self.parse_described(content, &description)
    }

    /// Parses a UTF-8 document held in a byte slice.
    fn parse_bytes(&self, content: &[u8]) -> Result<Box<dyn Source>, SourceError> {
        let text = std::str::from_utf8(content)
            .map_err(|e| SourceError::parse_with("document is not valid UTF-8", e))?;
        let description = format!("{} bytes", self.format_name());
        self.parse_described(text, &description)
    }

    /// Reads a whole document from `reader` and parses it.
    fn parse_reader(&self, reader: &mut dyn Read) -> Result<Box<dyn Source>, SourceError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        let description = format!("{} reader", self.format_name());
        self.parse_described(&content, &description)
    }

    /// Reads and parses the file at `path`.
    fn parse_file(&self, path: &Path) -> Result<Box<dyn Source>, SourceError> {
        let content = fs::read_to_string(path)?;
        let description = format!("{} file {}", self.format_name(), path.display());
        self.parse_described(&content, &description)
    }

    /// Names the format in source descriptions.
    fn format_name(&self) -> &str {
        self.supported_extensions().first().copied().unwrap_or("document")
    }
}
