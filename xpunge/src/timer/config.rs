//! # Timer configuration
//!
//! Parsers for the timer preferences: the daily absolute time and
//! the interval delays.

use std::str::FromStr;

use chrono::Timelike;
use tracing::warn;

use crate::{Error, Result};

/// Number of milliseconds in one minute.
pub const MINUTE_MILLIS: i64 = 60_000;

/// The absolute time of day the timer fires at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AbsoluteTime {
    pub hours: u32,
    pub minutes: u32,
}

impl AbsoluteTime {
    /// Return `true` if the given time matches the hour and the
    /// minute of this absolute time.
    pub fn matches(&self, time: &impl Timelike) -> bool {
        self.hours == time.hour() && self.minutes == time.minute()
    }
}

impl FromStr for AbsoluteTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut components = s.split(':');
        let err = || Error::ParseAbsoluteTimeError(s.to_owned());

        let hours = components.next().ok_or_else(err)?;
        let minutes = components.next().ok_or_else(err)?;

        Ok(Self {
            hours: parse_time_component(hours).ok_or_else(err)?,
            minutes: parse_time_component(minutes).ok_or_else(err)?,
        })
    }
}

/// Parse one component of a `HH:MM` time, one leading zero being
/// stripped first.
fn parse_time_component(component: &str) -> Option<u32> {
    let stripped = match component.strip_prefix('0') {
        Some("") | None => component,
        Some(stripped) => stripped,
    };

    stripped.parse().ok()
}

/// Check the given timer interval preference, and return its value
/// in minutes.
///
/// The interval must be a non-empty string made of ASCII digits only.
pub fn check_loop_interval(name: &'static str, interval: &str) -> Result<u64> {
    if interval.is_empty() {
        warn!(name, "empty loop timer interval preference");
        return Err(Error::EmptyIntervalError(name));
    }

    if !interval.bytes().all(|b| b.is_ascii_digit()) {
        warn!(name, interval, "invalid loop timer interval preference");
        return Err(Error::ParseIntervalError(name, interval.to_owned()));
    }

    interval
        .parse()
        .map_err(|_| Error::ParseIntervalError(name, interval.to_owned()))
}

/// Convert the given amount of minutes into milliseconds.
pub fn minutes_to_millis(minutes: u64) -> i64 {
    i64::try_from(minutes)
        .unwrap_or(i64::MAX)
        .saturating_mul(MINUTE_MILLIS)
}
