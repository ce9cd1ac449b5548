// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document values.
//!
//! `Value` is the tree that hierarchical sources are read from. Documents
//! parsed by a provider (for example YAML) are converted into a `Value`
//! first, and values can also be assembled directly in code for tests or
//! programmatic defaults.

use crate::domain::size_in_bytes::SizeInBytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Duration;

/// A node of an in-memory document.
///
/// # Examples
///
/// ```
/// use layercfg::domain::value::Value;
///
/// let doc: Value = [("a", Value::from_iter([("size", Value::from(1024))]))]
///     .into_iter()
///     .collect();
/// assert_eq!(doc.kind(), "map");
/// assert_eq!(doc.lookup(&["a", "size"]), Some(&Value::Int(1024)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A boolean
    Bool(bool),
    /// An integer
    Int(i64),
    /// A floating-point number
    Float(f64),
    /// A single character
    Char(char),
    /// A string
    Text(String),
    /// An exact decimal number
    Decimal(Decimal),
    /// A calendar date
    Date(NaiveDate),
    /// A wall-clock time
    Time(NaiveTime),
    /// A date and time without offset
    DateTime(NaiveDateTime),
    /// A date and time with a UTC offset
    OffsetDateTime(DateTime<FixedOffset>),
    /// A point in time in UTC
    Instant(DateTime<Utc>),
    /// A span of time
    Duration(Duration),
    /// A size in bytes
    Size(SizeInBytes),
    /// An ordered sequence
    List(Vec<Value>),
    /// A string-keyed mapping
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the name of this value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Text(_) => "text",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "date-time",
            Value::OffsetDateTime(_) => "offset-date-time",
            Value::Instant(_) => "instant",
            Value::Duration(_) => "duration",
            Value::Size(_) => "size",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Follows `path` through nested maps.
    ///
    /// The empty path returns `self`.
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter().try_fold(self, |node, segment| match node {
            Value::Map(map) => map.get(segment.as_ref()),
            _ => None,
        })
    }
}

/// Parses the textual booleans accepted by flat sources.
///
/// Recognizes (case-insensitive) `true`, `yes`, `1`, `on` and
/// `false`, `no`, `0`, `off`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    char => Char,
    String => Text,
    &str => Text,
    Decimal => Decimal,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    DateTime<Utc> => Instant,
    Duration => Duration,
    SizeInBytes => Size,
    BTreeMap<String, Value> => Map,
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
