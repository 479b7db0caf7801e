//! # Interval Parsing
//!
//! Poll intervals travel as short duration strings: a sequence of decimal
//! numbers, each with an optional fraction and a mandatory unit, e.g. `300ms`,
//! `1.5s`, `2h45m`. A leading sign is accepted so that negative values can be
//! reported precisely instead of as syntax errors.

use super::ConfigError;
use std::time::Duration;

const NANOS_PER_UNIT: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000), // U+00B5 micro sign
    ("μs", 1_000), // U+03BC greek mu
    ("ms", 1_000_000),
    ("s", 1_000_000_000),
    ("m", 60 * 1_000_000_000),
    ("h", 3_600 * 1_000_000_000),
];

// Fraction digits past this add nothing at nanosecond resolution.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parses `text` into a [`Duration`].
///
/// Negative durations cannot be represented and are rejected with
/// [`ConfigError::NonPositiveInterval`]; `-0s` parses as zero.
pub fn parse_duration(text: &str) -> Result<Duration, ConfigError> {
    let mut rest = text.trim();
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(ConfigError::InvalidDuration(text.to_string()));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let int_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_part, after_int) = rest.split_at(int_end);

        let mut frac_part = "";
        let mut after_number = after_int;
        if let Some(after_dot) = after_int.strip_prefix('.') {
            let frac_end = after_dot.find(|c: char| !c.is_ascii_digit()).unwrap_or(after_dot.len());
            frac_part = &after_dot[..frac_end];
            after_number = &after_dot[frac_end..];
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ConfigError::InvalidDuration(text.to_string()));
        }

        let unit_end = after_number
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after_number.len());
        let (unit, tail) = after_number.split_at(unit_end);
        if unit.is_empty() {
            return Err(ConfigError::MissingUnit(text.to_string()));
        }
        let scale = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, nanos)| *nanos)
            .ok_or_else(|| ConfigError::UnknownUnit {
                unit: unit.to_string(),
                text: text.to_string(),
            })?;

        let overflow = || ConfigError::DurationOverflow(text.to_string());
        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

        if !frac_part.is_empty() {
            let digits = &frac_part[..frac_part.len().min(MAX_FRACTION_DIGITS)];
            let fraction: u128 = digits.parse().map_err(|_| overflow())?;
            nanos += fraction * scale / 10u128.pow(digits.len() as u32);
        }

        total = total.checked_add(nanos).ok_or_else(overflow)?;
        rest = tail;
    }

    let nanos = u64::try_from(total).map_err(|_| ConfigError::DurationOverflow(text.to_string()))?;
    if negative && nanos > 0 {
        return Err(ConfigError::NonPositiveInterval(text.to_string()));
    }
    Ok(Duration::from_nanos(nanos))
}

/// Parses an interval packet payload. Only strictly positive durations qualify.
pub fn parse_interval(payload: &[u8]) -> Result<Duration, ConfigError> {
    let text = std::str::from_utf8(payload)?;
    let interval = parse_duration(text)?;
    if interval.is_zero() {
        return Err(ConfigError::NonPositiveInterval(text.to_string()));
    }
    Ok(interval)
}
