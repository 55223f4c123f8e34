//! Vendor frame parsing.
//!
//! Turns raw frame text into a [`Frame`] and a race-update frame into the
//! derived [`RaceUpdate`] fields. No schema validation beyond the `$type`
//! tag: unexpected field types fall back to defaults instead of failing.

use crate::error::{FeedError, FeedResult};
use crate::session::UNKNOWN_STATUS;
use chrono::{DateTime, NaiveDateTime, Utc};
use kart_ws::message::{frame_type, RACE_TYPE};
use serde_json::Value;

/// A parsed inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `$type == "BcRace"`.
    Race(Value),
    /// Any other `$type`, kept for logging.
    Other(String),
}

/// Parse frame text and classify it by `$type`.
///
/// Errors on invalid JSON and on a missing or non-string `$type`.
pub fn classify_frame(text: &str) -> FeedResult<Frame> {
    let value: Value = serde_json::from_str(text)?;

    let frame = match frame_type(&value) {
        Some(RACE_TYPE) => Frame::Race(value),
        Some(other) => Frame::Other(other.to_string()),
        None => return Err(FeedError::MissingType),
    };
    Ok(frame)
}

/// Where the remaining time of an update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// `ClockMs`, truncated to whole seconds.
    Clock,
    /// `ScheduledEnd` minus the local clock.
    ScheduledEnd,
    /// Neither field usable; remaining time is 0.
    Unavailable,
}

impl ClockSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockSource::Clock => "clock",
            ClockSource::ScheduledEnd => "scheduled_end",
            ClockSource::Unavailable => "unavailable",
        }
    }
}

/// Session fields derived from one race-update frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceUpdate {
    pub remaining_seconds: u64,
    pub session_status: String,
    pub clock_source: ClockSource,
}

impl RaceUpdate {
    /// Derive the session fields from a `BcRace` frame as of `now`.
    ///
    /// `ClockMs` wins over `ScheduledEnd` whenever it is numeric.
    pub fn from_frame(frame: &Value, now: DateTime<Utc>) -> Self {
        let session_status = frame
            .get("RaceState")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_STATUS)
            .to_string();

        let clock = frame.get("ClockMs").and_then(seconds_from_clock_ms);
        let (remaining_seconds, clock_source) = match clock {
            Some(secs) => (secs, ClockSource::Clock),
            None => match frame
                .get("ScheduledEnd")
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
            {
                Some(end) => (seconds_until(end, now), ClockSource::ScheduledEnd),
                None => (0, ClockSource::Unavailable),
            },
        };

        Self {
            remaining_seconds,
            session_status,
            clock_source,
        }
    }
}

/// Truncate a millisecond clock value to whole seconds, clamped at zero.
fn seconds_from_clock_ms(value: &Value) -> Option<u64> {
    if let Some(ms) = value.as_u64() {
        return Some(ms / 1000);
    }
    if let Some(ms) = value.as_i64() {
        // Only negative values reach this branch.
        return Some(u64::try_from(ms / 1000).unwrap_or(0));
    }
    value
        .as_f64()
        .filter(|ms| ms.is_finite())
        .map(|ms| (ms / 1000.0).trunc().max(0.0) as u64)
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `max(0, floor((end - now) / 1s))`.
fn seconds_until(end: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let diff_ms = (end - now).num_milliseconds();
    u64::try_from(diff_ms.div_euclid(1000)).unwrap_or(0)
}
