// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical source over an in-memory [`Value`] tree.
//!
//! This is the source every tree-shaped document ends up as: YAML documents
//! are converted into a `Value` and wrapped in a `ValueSource`. Values are
//! read strictly: text is never reinterpreted as a number or a boolean.
//! Temporal values, decimals, durations and sizes are accepted either in
//! their native form or as text in their usual grammar.

use crate::domain::duration::parse_duration;
use crate::domain::errors::SourceError;
use crate::domain::size_in_bytes::SizeInBytes;
use crate::domain::value::Value;
use crate::ports::source::{parse_text, wrong_type};
use crate::ports::Source;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// A source backed by a [`Value`].
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::ValueSource;
/// use layercfg::domain::value::Value;
/// use layercfg::ports::Source;
///
/// let doc = Value::from_iter([("hosts", Value::from(vec!["a", "b"]))]);
/// let source = ValueSource::new(doc).named("inline");
///
/// let hosts = source.get_key("hosts").unwrap().to_list().unwrap();
/// assert_eq!(hosts.len(), 2);
/// assert_eq!(hosts[1].to_text().unwrap(), "b");
/// ```
#[derive(Clone, Debug)]
pub struct ValueSource {
    value: Value,
    description: String,
}

impl ValueSource {
    /// Wraps a value.
    pub fn new(value: impl Into<Value>) -> Self {
        ValueSource {
            value: value.into(),
            description: "value".to_string(),
        }
    }

    /// Sets the description used in diagnostics.
    pub fn named(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the wrapped value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    fn child(&self, value: &Value, location: String) -> Box<dyn Source> {
        Box::new(ValueSource {
            value: value.clone(),
            description: format!("{} at {}", self.description, location),
        })
    }
}

impl Source for ValueSource {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn kind(&self) -> &'static str {
        self.value.kind()
    }

    fn get_or_none(&self, path: &[String]) -> Option<Box<dyn Source>> {
        if path.is_empty() {
            return Some(Box::new(self.clone()));
        }
        self.value
            .lookup(path)
            .map(|value| self.child(value, path.join(".")))
    }

    fn is_list(&self) -> bool {
        matches!(self.value, Value::List(_))
    }

    fn is_map(&self) -> bool {
        matches!(self.value, Value::Map(_))
    }

    fn is_text(&self) -> bool {
        matches!(self.value, Value::Text(_))
    }

    fn to_list(&self) -> Result<Vec<Box<dyn Source>>, SourceError> {
        match &self.value {
            Value::List(values) => Ok(values
                .iter()
                .enumerate()
                .map(|(index, value)| self.child(value, format!("[{index}]")))
                .collect()),
            _ => Err(wrong_type(self, "list")),
        }
    }

    fn to_map(&self) -> Result<BTreeMap<String, Box<dyn Source>>, SourceError> {
        match &self.value {
            Value::Map(entries) => Ok(entries
                .iter()
                .map(|(key, value)| (key.clone(), self.child(value, key.clone())))
                .collect()),
            _ => Err(wrong_type(self, "map")),
        }
    }

    fn to_text(&self) -> Result<String, SourceError> {
        match &self.value {
            Value::Text(text) => Ok(text.clone()),
            _ => Err(wrong_type(self, "text")),
        }
    }

    fn to_bool(&self) -> Result<bool, SourceError> {
        match self.value {
            Value::Bool(value) => Ok(value),
            _ => Err(wrong_type(self, "bool")),
        }
    }

    fn to_i64(&self) -> Result<i64, SourceError> {
        match self.value {
            Value::Int(value) => Ok(value),
            _ => Err(wrong_type(self, "int")),
        }
    }

    fn to_f64(&self) -> Result<f64, SourceError> {
        match self.value {
            Value::Float(value) => Ok(value),
            Value::Int(value) => Ok(value as f64),
            _ => Err(wrong_type(self, "float")),
        }
    }

    fn to_char(&self) -> Result<char, SourceError> {
        match &self.value {
            Value::Char(c) => Ok(*c),
            Value::Text(text) => {
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
            _ => Err(wrong_type(self, "char")),
        }
    }

    fn to_decimal(&self) -> Result<Decimal, SourceError> {
        match &self.value {
            Value::Decimal(value) => Ok(*value),
            Value::Int(value) => Ok(Decimal::from(*value)),
            Value::Float(value) => Decimal::from_f64(*value)
                .ok_or_else(|| SourceError::parse(format!("{value} cannot be represented as a decimal"))),
            Value::Text(text) => Decimal::from_str(text.trim())
                .or_else(|_| Decimal::from_scientific(text.trim()))
                .map_err(|e| SourceError::parse_with(format!("'{text}' is not a decimal number"), e)),
            _ => Err(wrong_type(self, "decimal")),
        }
    }

    fn to_date(&self) -> Result<NaiveDate, SourceError> {
        match &self.value {
            Value::Date(value) => Ok(*value),
            Value::Text(_) => parse_text(self, "date", |text| NaiveDate::from_str(text)),
            _ => Err(wrong_type(self, "date")),
        }
    }

    fn to_time(&self) -> Result<NaiveTime, SourceError> {
        match &self.value {
            Value::Time(value) => Ok(*value),
            Value::Text(_) => parse_text(self, "time", |text| NaiveTime::from_str(text)),
            _ => Err(wrong_type(self, "time")),
        }
    }

    fn to_date_time(&self) -> Result<NaiveDateTime, SourceError> {
        match &self.value {
            Value::DateTime(value) => Ok(*value),
            Value::Text(_) => parse_text(self, "date-time", |text| NaiveDateTime::from_str(text)),
            _ => Err(wrong_type(self, "date-time")),
        }
    }

    fn to_offset_date_time(&self) -> Result<DateTime<FixedOffset>, SourceError> {
        match &self.value {
            Value::OffsetDateTime(value) => Ok(*value),
            Value::Instant(value) => Ok(value.fixed_offset()),
            Value::Text(_) => parse_text(self, "offset-date-time", DateTime::parse_from_rfc3339),
            _ => Err(wrong_type(self, "offset-date-time")),
        }
    }

    fn to_instant(&self) -> Result<DateTime<Utc>, SourceError> {
        match &self.value {
            Value::Instant(value) => Ok(*value),
            Value::OffsetDateTime(value) => Ok(value.with_timezone(&Utc)),
            Value::Text(_) => parse_text(self, "instant", |text| text.parse::<DateTime<Utc>>()),
            _ => Err(wrong_type(self, "instant")),
        }
    }

    fn to_duration(&self) -> Result<Duration, SourceError> {
        match &self.value {
            Value::Duration(value) => Ok(*value),
            Value::Int(millis) => u64::try_from(*millis)
                .map(Duration::from_millis)
                .map_err(|_| SourceError::parse(format!("negative duration '{millis}' is not supported"))),
            Value::Text(text) => parse_duration(text),
            _ => Err(wrong_type(self, "duration")),
        }
    }

    fn to_size(&self) -> Result<SizeInBytes, SourceError> {
        match &self.value {
            Value::Size(value) => Ok(*value),
            Value::Int(bytes) => u64::try_from(*bytes)
                .map(SizeInBytes::new)
                .map_err(|_| SourceError::parse(format!("negative size '{bytes}' is not supported"))),
            Value::Text(text) => SizeInBytes::parse(text),
            _ => Err(wrong_type(self, "size")),
        }
    }
}
