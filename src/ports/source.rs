// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source trait definition.
//!
//! A `Source` is a read-only view over a document (a map, a list or a
//! scalar) addressed by dotted paths. Adapters implement the handful of
//! accessors their format can answer natively; everything else has a
//! default built on top of those.

use crate::adapters::fallback::FallbackSource;
use crate::domain::config_path::split_key;
use crate::domain::duration::parse_duration;
use crate::domain::errors::SourceError;
use crate::domain::size_in_bytes::SizeInBytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// A read-only, addressable view over a configuration document.
///
/// Implementations must be `Send + Sync` so a source can be built on one
/// thread and loaded on another.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::ValueSource;
/// use layercfg::domain::value::Value;
/// use layercfg::ports::Source;
///
/// let doc = Value::from_iter([("server", Value::from_iter([("port", 8080)]))]);
/// let source = ValueSource::new(doc);
///
/// assert!(source.contains_key("server.port"));
/// assert_eq!(source.get_key("server.port").unwrap().to_i64().unwrap(), 8080);
/// assert!(source.get_key("server.host").is_err());
/// ```
pub trait Source: fmt::Debug + Send + Sync {
    /// Describes this source for diagnostics.
    fn description(&self) -> String;

    /// Names the kind of value at this node, such as `map` or `text`.
    fn kind(&self) -> &'static str;

    /// Returns the sub-source at `path`, or `None` if there is nothing there.
    ///
    /// The empty path addresses this source itself.
    fn get_or_none(&self, path: &[String]) -> Option<Box<dyn Source>>;

    /// Returns `true` if there is a value at `path`.
    fn contains(&self, path: &[String]) -> bool {
        self.get_or_none(path).is_some()
    }

    /// Returns the sub-source at `path`.
    fn get(&self, path: &[String]) -> Result<Box<dyn Source>, SourceError> {
        self.get_or_none(path)
            .ok_or_else(|| SourceError::NoSuchPath {
                description: self.description(),
                path: path.join("."),
            })
    }

    /// Returns `true` if there is a value at the dotted `key`.
    fn contains_key(&self, key: &str) -> bool {
        self.contains(&split_key(key))
    }

    /// Returns the sub-source at the dotted `key`.
    fn get_key(&self, key: &str) -> Result<Box<dyn Source>, SourceError> {
        self.get(&split_key(key))
    }

    /// Returns the sub-source at the dotted `key`, if any.
    fn get_key_or_none(&self, key: &str) -> Option<Box<dyn Source>> {
        self.get_or_none(&split_key(key))
    }

    /// Returns `true` if this node can be viewed as a list.
    fn is_list(&self) -> bool {
        false
    }

    /// Returns `true` if this node can be viewed as a map.
    fn is_map(&self) -> bool {
        false
    }

    /// Returns `true` if this node holds text.
    fn is_text(&self) -> bool {
        false
    }

    /// Views this node as a list of sub-sources.
    fn to_list(&self) -> Result<Vec<Box<dyn Source>>, SourceError> {
        Err(wrong_type(self, "list"))
    }

    /// Views this node as a string-keyed map of sub-sources.
    fn to_map(&self) -> Result<BTreeMap<String, Box<dyn Source>>, SourceError> {
        Err(wrong_type(self, "map"))
    }

    /// Views this node as text.
    fn to_text(&self) -> Result<String, SourceError> {
        Err(wrong_type(self, "text"))
    }

    /// Views this node as a boolean.
    fn to_bool(&self) -> Result<bool, SourceError> {
        Err(wrong_type(self, "bool"))
    }

    /// Views this node as a 64-bit integer.
    fn to_i64(&self) -> Result<i64, SourceError> {
        Err(wrong_type(self, "int"))
    }

    /// Views this node as a 64-bit float.
    fn to_f64(&self) -> Result<f64, SourceError> {
        Err(wrong_type(self, "float"))
    }

    /// Views this node as an `i8`, failing if it is out of range.
    fn to_i8(&self) -> Result<i8, SourceError> {
        narrow(self.to_i64()?, "i8")
    }

    /// Views this node as an `i16`, failing if it is out of range.
    fn to_i16(&self) -> Result<i16, SourceError> {
        narrow(self.to_i64()?, "i16")
    }

    /// Views this node as an `i32`, failing if it is out of range.
    fn to_i32(&self) -> Result<i32, SourceError> {
        narrow(self.to_i64()?, "i32")
    }

    /// Views this node as an `i128`.
    fn to_i128(&self) -> Result<i128, SourceError> {
        self.to_i64().map(i128::from)
    }

    /// Views this node as a `u8`, failing if it is out of range.
    fn to_u8(&self) -> Result<u8, SourceError> {
        narrow(self.to_i64()?, "u8")
    }

    /// Views this node as a `u16`, failing if it is out of range.
    fn to_u16(&self) -> Result<u16, SourceError> {
        narrow(self.to_i64()?, "u16")
    }

    /// Views this node as a `u32`, failing if it is out of range.
    fn to_u32(&self) -> Result<u32, SourceError> {
        narrow(self.to_i64()?, "u32")
    }

    /// Views this node as a `u64`, failing if it is negative.
    fn to_u64(&self) -> Result<u64, SourceError> {
        narrow(self.to_i64()?, "u64")
    }

    /// Views this node as a 32-bit float.
    fn to_f32(&self) -> Result<f32, SourceError> {
        self.to_f64().map(|value| value as f32)
    }

    /// Views this node as a single character.
    fn to_char(&self) -> Result<char, SourceError> {
        let text = self.to_text()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(SourceError::WrongType {
                description: format!("\"{text}\""),
                actual: "text".to_string(),
                expected: "char".to_string(),
            }),
        }
    }

    /// Views this node as an exact decimal.
    ///
    /// Text is parsed as a decimal literal; anything else goes through
    /// [`Source::to_f64`].
    fn to_decimal(&self) -> Result<Decimal, SourceError> {
        if self.is_text() {
            let text = self.to_text()?;
            let trimmed = text.trim();
            return Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|e| SourceError::parse_with(format!("'{text}' is not a decimal number"), e));
        }
        let value = self.to_f64()?;
        Decimal::from_f64(value)
            .ok_or_else(|| SourceError::parse(format!("{value} cannot be represented as a decimal")))
    }

    /// Views this node as a date (`2024-03-01`).
    fn to_date(&self) -> Result<NaiveDate, SourceError> {
        parse_text(self, "date", |text| NaiveDate::from_str(text))
    }

    /// Views this node as a time (`13:45:00`).
    fn to_time(&self) -> Result<NaiveTime, SourceError> {
        parse_text(self, "time", |text| NaiveTime::from_str(text))
    }

    /// Views this node as a local date-time (`2024-03-01T13:45:00`).
    fn to_date_time(&self) -> Result<NaiveDateTime, SourceError> {
        parse_text(self, "date-time", |text| NaiveDateTime::from_str(text))
    }

    /// Views this node as an RFC 3339 date-time with offset.
    fn to_offset_date_time(&self) -> Result<DateTime<FixedOffset>, SourceError> {
        parse_text(self, "offset-date-time", DateTime::parse_from_rfc3339)
    }

    /// Views this node as an instant, converting any offset to UTC.
    fn to_instant(&self) -> Result<DateTime<Utc>, SourceError> {
        parse_text(self, "instant", |text| text.parse::<DateTime<Utc>>())
    }

    /// Views this node as a duration (`200ms`, `PT1.5S`, ...).
    fn to_duration(&self) -> Result<Duration, SourceError> {
        parse_duration(&self.to_text()?)
    }

    /// Views this node as a size in bytes (`10k`, `512MiB`, ...).
    fn to_size(&self) -> Result<SizeInBytes, SourceError> {
        SizeInBytes::parse(&self.to_text()?)
    }

    /// Composes this source with `fallback`, which is consulted only for
    /// paths this source does not contain.
    ///
    /// A value that is present here but has the wrong type is reported, not
    /// replaced by the fallback's value.
    fn with_fallback<F>(self, fallback: F) -> FallbackSource
    where
        Self: Sized + 'static,
        F: Source + 'static,
    {
        FallbackSource::new(Box::new(self), Box::new(fallback))
    }
}

/// Builds the `WrongType` error for `source` viewed as `expected`.
pub fn wrong_type<S: Source + ?Sized>(source: &S, expected: &str) -> SourceError {
    SourceError::WrongType {
        description: source.description(),
        actual: source.kind().to_string(),
        expected: expected.to_string(),
    }
}

pub(crate) fn narrow<T: TryFrom<i64>>(value: i64, target: &str) -> Result<T, SourceError> {
    T::try_from(value).map_err(|_| SourceError::parse(format!("{value} is out of range of {target}")))
}

pub(crate) fn parse_text<S, T, E, F>(source: &S, expected: &str, parse: F) -> Result<T, SourceError>
where
    S: Source + ?Sized,
    E: std::error::Error + Send + Sync + 'static,
    F: FnOnce(&str) -> Result<T, E>,
{
    let text = source.to_text()?;
    parse(text.trim())
        .map_err(|e| SourceError::parse_with(format!("'{text}' is not a valid {expected}"), e))
}
