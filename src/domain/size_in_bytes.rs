// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sizes in bytes with a unit-suffixed textual grammar.
//!
//! Accepted forms include `1024`, `512B`, `10k`, `10K`, `10Ki`, `10KiB`,
//! `10kB`, `10MB`, `1.5 gibibytes` and `2 megabytes`. Single-letter and `Xi`
//! suffixes are binary (powers of 1024); `kB`, `MB`, … and the long decimal
//! names are powers of 1000.

use crate::domain::errors::SourceError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A number of bytes.
///
/// # Examples
///
/// ```
/// use layercfg::domain::size_in_bytes::SizeInBytes;
///
/// let size: SizeInBytes = "10k".parse().unwrap();
/// assert_eq!(size.bytes, 10240);
///
/// let size: SizeInBytes = "2 MB".parse().unwrap();
/// assert_eq!(size.bytes, 2_000_000);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeInBytes {
    /// The size in bytes
    pub bytes: u64,
}

impl SizeInBytes {
    /// Creates a size from a byte count.
    pub const fn new(bytes: u64) -> Self {
        SizeInBytes { bytes }
    }

    /// Parses a size with an optional unit suffix.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        parse_bytes(input).map(SizeInBytes::new)
    }
}

impl From<u64> for SizeInBytes {
    fn from(bytes: u64) -> Self {
        SizeInBytes::new(bytes)
    }
}

impl FromStr for SizeInBytes {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeInBytes::parse(s)
    }
}

impl fmt::Display for SizeInBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.bytes)
    }
}

#[derive(Clone, Copy, Debug)]
struct MemoryUnit {
    prefix: &'static str,
    base: u128,
    power: u32,
}

impl MemoryUnit {
    const fn new(prefix: &'static str, base: u128, power: u32) -> Self {
        MemoryUnit {
            prefix,
            base,
            power,
        }
    }

    fn bytes(&self) -> u128 {
        self.base.pow(self.power)
    }
}

const MEMORY_UNITS: [MemoryUnit; 17] = [
    MemoryUnit::new("", 1024, 0),
    MemoryUnit::new("kilo", 1000, 1),
    MemoryUnit::new("mega", 1000, 2),
    MemoryUnit::new("giga", 1000, 3),
    MemoryUnit::new("tera", 1000, 4),
    MemoryUnit::new("peta", 1000, 5),
    MemoryUnit::new("exa", 1000, 6),
    MemoryUnit::new("zetta", 1000, 7),
    MemoryUnit::new("yotta", 1000, 8),
    MemoryUnit::new("kibi", 1024, 1),
    MemoryUnit::new("mebi", 1024, 2),
    MemoryUnit::new("gibi", 1024, 3),
    MemoryUnit::new("tebi", 1024, 4),
    MemoryUnit::new("pebi", 1024, 5),
    MemoryUnit::new("exbi", 1024, 6),
    MemoryUnit::new("zebi", 1024, 7),
    MemoryUnit::new("yobi", 1024, 8),
];

static UNITS_BY_SUFFIX: Lazy<HashMap<String, MemoryUnit>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for unit in MEMORY_UNITS {
        map.insert(format!("{}byte", unit.prefix), unit);
        map.insert(format!("{}bytes", unit.prefix), unit);
        if unit.prefix.is_empty() {
            map.insert("b".to_string(), unit);
            map.insert("B".to_string(), unit);
            map.insert(String::new(), unit);
            continue;
        }
        let first = &unit.prefix[..1];
        let upper = first.to_uppercase();
        if unit.base == 1024 {
            map.insert(first.to_string(), unit);
            map.insert(upper.clone(), unit);
            map.insert(format!("{upper}i"), unit);
            map.insert(format!("{upper}iB"), unit);
        } else if unit.power == 1 {
            map.insert(format!("{first}B"), unit);
        } else {
            map.insert(format!("{upper}B"), unit);
        }
    }
    map
});

/// Splits `input` into its numeric part and its trailing alphabetic unit.
pub(crate) fn split_unit(input: &str) -> (&str, &str) {
    let number_end = input
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(index, c)| index + c.len_utf8())
        .unwrap_or(0);
    (input[..number_end].trim(), &input[number_end..])
}

fn parse_bytes(input: &str) -> Result<u64, SourceError> {
    let trimmed = input.trim();
    let (number, unit_name) = split_unit(trimmed);
    if number.is_empty() {
        return Err(SourceError::parse(format!(
            "No number in size-in-bytes value '{input}'"
        )));
    }
    let unit = UNITS_BY_SUFFIX.get(unit_name).ok_or_else(|| {
        SourceError::parse(format!(
            "Could not parse size-in-bytes unit '{unit_name}' (try k, K, kB, KiB, kilobytes, kibibytes)"
        ))
    })?;

    let out_of_range =
        || SourceError::parse(format!("size-in-bytes value is out of range for a 64-bit integer: '{input}'"));

    let bytes = if number.bytes().all(|b| b.is_ascii_digit()) {
        let count: u128 = number.parse().map_err(|e| {
            SourceError::parse_with(format!("Could not parse size-in-bytes number '{number}'"), e)
        })?;
        count.checked_mul(unit.bytes()).ok_or_else(out_of_range)?
    } else {
        let count: f64 = number.parse().map_err(|e| {
            SourceError::parse_with(format!("Could not parse size-in-bytes number '{number}'"), e)
        })?;
        let product = count * unit.bytes() as f64;
        if !product.is_finite() || product < 0.0 {
            return Err(out_of_range());
        }
        product as u128
    };
    u64::try_from(bytes).map_err(|_| out_of_range())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(input: &str) -> u64 {
        SizeInBytes::parse(input).unwrap().bytes
    }

    #[test]
    fn test_plain_number_is_bytes() {
        assert_eq!(bytes("1024"), 1024);
        assert_eq!(bytes("  7  "), 7);
        assert_eq!(bytes("12B"), 12);
        assert_eq!(bytes("12 bytes"), 12);
    }

    #[test]
    fn test_single_letter_units_are_binary() {
        assert_eq!(bytes("10k"), 10240);
        assert_eq!(bytes("10K"), 10240);
        assert_eq!(bytes("1m"), 1024 * 1024);
        assert_eq!(bytes("1G"), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_iec_units() {
        assert_eq!(bytes("10Ki"), 10240);
        assert_eq!(bytes("10KiB"), 10240);
        assert_eq!(bytes("2 mebibytes"), 2 * 1024 * 1024);
    }

    #[test]
    fn test_si_units() {
        assert_eq!(bytes("10kB"), 10_000);
        assert_eq!(bytes("3MB"), 3_000_000);
        assert_eq!(bytes("1 kilobyte"), 1000);
        assert_eq!(bytes("5 gigabytes"), 5_000_000_000);
    }

    #[test]
    fn test_fractional_numbers() {
        assert_eq!(bytes("1.5k"), 1536);
        assert_eq!(bytes("0.5 kilobytes"), 500);
    }

    #[test]
    fn test_missing_number() {
        let error = SizeInBytes::parse("kB").unwrap_err();
        assert!(error.to_string().contains("No number"));
    }

    #[test]
    fn test_unknown_unit() {
        let error = SizeInBytes::parse("10 furlongs").unwrap_err();
        assert!(error.to_string().contains("furlongs"));
    }

    #[test]
    fn test_unit_is_case_sensitive() {
        assert!(SizeInBytes::parse("10kb").is_err());
    }

    #[test]
    fn test_out_of_range() {
        assert!(SizeInBytes::parse("1 yottabyte").is_err());
        assert!(SizeInBytes::parse("-1k").is_err());
        assert_eq!(bytes("15EiB"), 15 * (1u64 << 60));
    }

    #[test]
    fn test_display() {
        assert_eq!(SizeInBytes::new(42).to_string(), "42B");
    }
}
