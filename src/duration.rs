//! Human-readable transition lengths.
//!
//! Configuration expresses the fade length as a short string such as `"60m"`,
//! `"2h"`, `"30s"` or a bare `"45"` (seconds). [`parse_duration`] turns that
//! into whole seconds and [`TransitionPeriod`] wraps the positive result the
//! rest of the engine works with.

use std::time::Duration;

use thiserror::Error;

/// Reasons a duration string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("no transition time given")]
    Empty,
    #[error("`{0}` is not a valid duration")]
    InvalidDuration(String),
    #[error("time unit `{0}` given, but is not supported (use s, m or h)")]
    UnsupportedTimeUnit(char),
    #[error("transition period must be greater than zero")]
    NotPositive,
}

/// Parse a duration string into seconds.
///
/// Whitespace is trimmed and removed, the input is lower-cased, and the last
/// character selects the unit (`s`, `m`, `h`). A non-alphabetic last character
/// means the whole string is a number of seconds.
pub fn parse_duration(input: &str) -> Result<u64, DurationError> {
    if input.is_empty() {
        return Err(DurationError::Empty);
    }

    let normalized: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != ' ')
        .collect();

    let Some(last) = normalized.chars().last() else {
        return Err(DurationError::InvalidDuration(input.to_string()));
    };

    let (number, multiplier) = if last.is_alphabetic() {
        let multiplier = match last {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            other => return Err(DurationError::UnsupportedTimeUnit(other)),
        };
        (&normalized[..normalized.len() - last.len_utf8()], multiplier)
    } else {
        (normalized.as_str(), 1)
    };

    // `u64::from_str` accepts a leading '+', which is still a non-negative integer
    let value: u64 = number
        .parse()
        .map_err(|_| DurationError::InvalidDuration(input.to_string()))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| DurationError::InvalidDuration(input.to_string()))
}

/// Length of a full 0→255 or 255→0 fade, in whole seconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransitionPeriod(u64);

impl TransitionPeriod {
    /// Parse and validate a configured transition speed.
    pub fn parse(input: &str) -> Result<Self, DurationError> {
        Self::from_secs(parse_duration(input)?)
    }

    pub fn from_secs(secs: u64) -> Result<Self, DurationError> {
        if secs == 0 {
            return Err(DurationError::NotPositive);
        }
        Ok(Self(secs))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }

    /// Half the period, used to centre a fade on its solar event.
    pub fn half(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.0 * 1000 / 2) as i64)
    }
}

impl std::fmt::Display for TransitionPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.0)
    }
}
