// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composition of two sources.

use crate::domain::errors::SourceError;
use crate::domain::size_in_bytes::SizeInBytes;
use crate::ports::Source;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Duration;

/// A source that consults `fallback` only where `primary` has nothing.
///
/// Lookups by path try the primary source first. Every value accessor on the
/// composed source itself answers from the primary, so a value that exists
/// there with the wrong type is reported as such.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::KvSource;
/// use layercfg::ports::Source;
///
/// let primary = KvSource::new([("a.x", 1)]);
/// let fallback = KvSource::new([("a.x", 9), ("a.y", 2)]);
/// let source = primary.with_fallback(fallback);
///
/// assert_eq!(source.get_key("a.x").unwrap().to_i64().unwrap(), 1);
/// assert_eq!(source.get_key("a.y").unwrap().to_i64().unwrap(), 2);
/// ```
#[derive(Debug)]
pub struct FallbackSource {
    primary: Box<dyn Source>,
    fallback: Box<dyn Source>,
}

impl FallbackSource {
    /// Composes `primary` with `fallback`.
    pub fn new(primary: Box<dyn Source>, fallback: Box<dyn Source>) -> Self {
        FallbackSource { primary, fallback }
    }

    /// Returns the primary source.
    pub fn primary(&self) -> &dyn Source {
        self.primary.as_ref()
    }

    /// Returns the fallback source.
    pub fn fallback(&self) -> &dyn Source {
        self.fallback.as_ref()
    }
}

impl Source for FallbackSource {
    fn description(&self) -> String {
        format!(
            "{} (fallback: {})",
            self.primary.description(),
            self.fallback.description()
        )
    }

    fn kind(&self) -> &'static str {
        self.primary.kind()
    }

    fn contains(&self, path: &[String]) -> bool {
        self.primary.contains(path) || self.fallback.contains(path)
    }

    fn get_or_none(&self, path: &[String]) -> Option<Box<dyn Source>> {
        self.primary
            .get_or_none(path)
            .or_else(|| self.fallback.get_or_none(path))
    }

    fn get(&self, path: &[String]) -> Result<Box<dyn Source>, SourceError> {
        match self.primary.get_or_none(path) {
            Some(source) => Ok(source),
            None => self.fallback.get(path),
        }
    }

    fn is_list(&self) -> bool {
        self.primary.is_list()
    }

    fn is_map(&self) -> bool {
        self.primary.is_map()
    }

    fn is_text(&self) -> bool {
        self.primary.is_text()
    }

    fn to_list(&self) -> Result<Vec<Box<dyn Source>>, SourceError> {
        self.primary.to_list()
    }

    fn to_map(&self) -> Result<BTreeMap<String, Box<dyn Source>>, SourceError> {
        self.primary.to_map()
    }

    fn to_text(&self) -> Result<String, SourceError> {
        self.primary.to_text()
    }

    fn to_bool(&self) -> Result<bool, SourceError> {
        self.primary.to_bool()
    }

    fn to_i64(&self) -> Result<i64, SourceError> {
        self.primary.to_i64()
    }

    fn to_f64(&self) -> Result<f64, SourceError> {
        self.primary.to_f64()
    }

    fn to_u64(&self) -> Result<u64, SourceError> {
        self.primary.to_u64()
    }

    fn to_i128(&self) -> Result<i128, SourceError> {
        self.primary.to_i128()
    }

    fn to_char(&self) -> Result<char, SourceError> {
        self.primary.to_char()
    }

    fn to_decimal(&self) -> Result<Decimal, SourceError> {
        self.primary.to_decimal()
    }

    fn to_date(&self) -> Result<NaiveDate, SourceError> {
        self.primary.to_date()
    }

    fn to_time(&self) -> Result<NaiveTime, SourceError> {
        self.primary.to_time()
    }

    fn to_date_time(&self) -> Result<NaiveDateTime, SourceError> {
        self.primary.to_date_time()
    }

    fn to_offset_date_time(&self) -> Result<DateTime<FixedOffset>, SourceError> {
        self.primary.to_offset_date_time()
    }

    fn to_instant(&self) -> Result<DateTime<Utc>, SourceError> {
        self.primary.to_instant()
    }

    fn to_duration(&self) -> Result<Duration, SourceError> {
        self.primary.to_duration()
    }

    fn to_size(&self) -> Result<SizeInBytes, SourceError> {
        self.primary.to_size()
    }
}
