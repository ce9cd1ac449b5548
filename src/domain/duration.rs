// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of textual durations.
//!
//! Two grammars are accepted. ISO-8601 durations of the form
//! `PnDTnHnMn.nS` are tried first; anything else goes through the
//! unit-suffixed grammar (`200ms`, `10 s`, `1.5 hours`, `3d`). A bare number
//! is a count of milliseconds.

use crate::domain::errors::SourceError;
use crate::domain::size_in_bytes::split_unit;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: u128 = 24 * NANOS_PER_HOUR;

/// Parses a duration from text.
///
/// # Examples
///
/// ```
/// use layercfg::domain::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("200ms").unwrap(), Duration::from_millis(200));
/// assert_eq!(parse_duration("PT1M30S").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("1500").unwrap(), Duration::from_millis(1500));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, SourceError> {
    match parse_iso8601(input.trim())? {
        Some(duration) => Ok(duration),
        None => parse_with_unit(input),
    }
}

/// Parses the `[+-]PnDTnHnMn.nS` form.
///
/// Returns `Ok(None)` when `input` is not ISO-8601 at all, so the caller can
/// try the unit grammar instead.
fn parse_iso8601(input: &str) -> Result<Option<Duration>, SourceError> {
    let (negative, rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let Some(body) = rest.strip_prefix(['P', 'p']) else {
        return Ok(None);
    };

    let (date_part, time_part) = match body.find(['T', 't']) {
        Some(index) => (&body[..index], Some(&body[index + 1..])),
        None => (body, None),
    };

    let mut nanos: i128 = 0;
    let mut components = 0;

    if !date_part.is_empty() {
        let Some(days) = date_part.strip_suffix(['D', 'd']) else {
            return Ok(None);
        };
        let Ok(days) = days.parse::<i64>() else {
            return Ok(None);
        };
        nanos += i128::from(days) * NANOS_PER_DAY as i128;
        components += 1;
    }

    if let Some(mut time) = time_part {
        if time.is_empty() {
            return Ok(None);
        }
        for (designator, scale) in [
            (['H', 'h'], NANOS_PER_HOUR),
            (['M', 'm'], NANOS_PER_MINUTE),
        ] {
            if let Some(index) = time.find(designator) {
                let Ok(value) = time[..index].parse::<i64>() else {
                    return Ok(None);
                };
                nanos += i128::from(value) * scale as i128;
                components += 1;
                time = &time[index + 1..];
            }
        }
        if !time.is_empty() {
            let Some(seconds) = time.strip_suffix(['S', 's']) else {
                return Ok(None);
            };
            let Some(seconds_nanos) = parse_iso_seconds(seconds) else {
                return Ok(None);
            };
            nanos += seconds_nanos;
            components += 1;
        }
    }

    if components == 0 {
        return Ok(None);
    }
    if negative {
        nanos = -nanos;
    }
    nanos_to_duration(nanos, input).map(Some)
}

fn parse_iso_seconds(text: &str) -> Option<i128> {
    let (whole, fraction) = match text.split_once(['.', ',']) {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };
    let negative = whole.starts_with('-');
    let seconds: i64 = whole.parse().ok()?;
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let fraction_nanos: i128 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}").parse().ok()?
    };
    let total = i128::from(seconds) * NANOS_PER_SECOND as i128;
    Some(if negative {
        total - fraction_nanos
    } else {
        total + fraction_nanos
    })
}

fn parse_with_unit(input: &str) -> Result<Duration, SourceError> {
    let trimmed = input.trim();
    let (number, original_unit) = split_unit(trimmed);
    if number.is_empty() {
        return Err(SourceError::parse(format!(
            "No number in duration value '{input}'"
        )));
    }

    let mut unit = original_unit.to_string();
    if unit.len() > 2 && !unit.ends_with('s') {
        unit.push('s');
    }

    let nanos_per_unit = match unit.as_str() {
        "" | "ms" | "millis" | "milliseconds" => NANOS_PER_MILLI,
        "us" | "micros" | "microseconds" => NANOS_PER_MICRO,
        "ns" | "nanos" | "nanoseconds" => 1,
        "d" | "days" => NANOS_PER_DAY,
        "h" | "hours" => NANOS_PER_HOUR,
        "s" | "seconds" => NANOS_PER_SECOND,
        "m" | "minutes" => NANOS_PER_MINUTE,
        _ => {
            return Err(SourceError::parse(format!(
                "Could not parse time unit '{original_unit}' (try ns, us, ms, s, m, h, d)"
            )))
        }
    };

    let unsigned = number.strip_prefix(['+', '-']).unwrap_or(number);
    let nanos = if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        let count: i128 = number.parse().map_err(|e| {
            SourceError::parse_with(format!("Could not parse duration number '{number}'"), e)
        })?;
        count
            .checked_mul(nanos_per_unit as i128)
            .ok_or_else(|| out_of_range(input))?
    } else {
        let count: f64 = number.parse().map_err(|e| {
            SourceError::parse_with(format!("Could not parse duration number '{number}'"), e)
        })?;
        let product = count * nanos_per_unit as f64;
        if !product.is_finite() {
            return Err(out_of_range(input));
        }
        product as i128
    };
    nanos_to_duration(nanos, input)
}

fn nanos_to_duration(nanos: i128, input: &str) -> Result<Duration, SourceError> {
    if nanos < 0 {
        return Err(SourceError::parse(format!(
            "negative duration '{input}' is not supported"
        )));
    }
    let nanos = nanos as u128;
    let seconds = u64::try_from(nanos / NANOS_PER_SECOND).map_err(|_| out_of_range(input))?;
    let subsec = (nanos % NANOS_PER_SECOND) as u32;
    Ok(Duration::new(seconds, subsec))
}

fn out_of_range(input: &str) -> SourceError {
    SourceError::parse(format!("duration value is out of range: '{input}'"))
}
