// Conversion between service time representations and seconds

use log::debug;

use crate::errors::LapvizError;
use crate::session::TimeValue;

/// Prefix the data service puts in front of timedelta strings.
pub const DAY_OFFSET_PREFIX: &str = "0 days ";

const ZERO_DURATION: &str = "0:00.000";

/// Parses a time value into seconds.
///
/// Numbers are returned as they are and a missing value is `0`. Strings go
/// through [`parse_duration_str`].
pub fn parse_duration(value: &TimeValue) -> Result<f64, LapvizError> {
    match value {
        TimeValue::Seconds(seconds) => Ok(*seconds),
        TimeValue::Text(text) => parse_duration_str(text),
        TimeValue::Missing => Ok(0.),
    }
}

/// Parses `[0 days ][[H:]M:]S[.fff]` into seconds.
///
/// An empty string is `0`. Hours and minutes must be whole numbers, the
/// seconds field may carry a fraction.
pub fn parse_duration_str(value: &str) -> Result<f64, LapvizError> {
    let trimmed = value.trim();
    let clean = trimmed
        .strip_prefix(DAY_OFFSET_PREFIX)
        .unwrap_or(trimmed)
        .trim();
    if clean.is_empty() {
        return Ok(0.);
    }

    let seconds = if clean.contains(':') {
        let parts: Vec<&str> = clean.split(':').collect();
        match parts.as_slice() {
            [hours, minutes, seconds] => {
                parse_whole(hours, value)? * 3600.
                    + parse_whole(minutes, value)? * 60.
                    + parse_seconds(seconds, value)?
            }
            [minutes, seconds] => parse_whole(minutes, value)? * 60. + parse_seconds(seconds, value)?,
            _ => {
                return Err(LapvizError::TooManyTimeParts {
                    value: value.to_string(),
                    parts: parts.len(),
                });
            }
        }
    } else {
        parse_seconds(clean, value)?
    };

    if !seconds.is_finite() {
        return Err(LapvizError::InvalidDuration {
            value: value.to_string(),
        });
    }
    Ok(seconds)
}

fn parse_whole(field: &str, value: &str) -> Result<f64, LapvizError> {
    field
        .trim()
        .parse::<i64>()
        .map(|v| v as f64)
        .map_err(|_| LapvizError::InvalidDuration {
            value: value.to_string(),
        })
}

fn parse_seconds(field: &str, value: &str) -> Result<f64, LapvizError> {
    match field.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => Ok(seconds),
        _ => Err(LapvizError::InvalidDuration {
            value: value.to_string(),
        }),
    }
}

/// Lenient parse used by the aggregations: `Some` only for a finite,
/// strictly positive duration. Anything else means "no usable time".
pub fn lap_seconds(value: &TimeValue) -> Option<f64> {
    match parse_duration(value) {
        Ok(seconds) if seconds.is_finite() && seconds > 0. => Some(seconds),
        Ok(_) => None,
        Err(e) => {
            debug!("Ignoring unusable time value: {}", e);
            None
        }
    }
}

/// Formats seconds as `M:SS.mmm` for display.
///
/// Minutes are not rolled over into hours. Non-finite input renders as
/// `0:00.000` and negative input is clamped to zero.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() {
        return ZERO_DURATION.to_string();
    }
    // round once to whole milliseconds so 59.9996 becomes 1:00.000, not 0:60.000
    let total_ms = (seconds.max(0.) * 1000.).round() as u64;
    let minutes = total_ms / 60_000;
    let remainder_ms = total_ms % 60_000;
    format!(
        "{}:{:02}.{:03}",
        minutes,
        remainder_ms / 1000,
        remainder_ms % 1000
    )
}
