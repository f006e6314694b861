//! Wire timestamps.
//!
//! The API mixes epoch seconds, epoch milliseconds and ISO-8601 strings for
//! the same logical instant. [`Timestamp`] accepts all of them on decode and
//! encodes with the [`DateFormat`] active for the current `encode` call.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::SchemaError;

/// Default encoding: microsecond precision, `Z` suffix.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Largest epoch value still read as seconds (9999-12-31T23:59:59Z).
/// Anything above is taken as milliseconds.
const MAX_EPOCH_SECONDS: i64 = 253_402_300_799;

const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// How [`Timestamp`] fields are written by `encode`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// `2020-08-28T10:56:09.969000Z`.
    #[default]
    Iso8601,
    /// Integer milliseconds since the Unix epoch.
    EpochMillis,
    /// Integer seconds since the Unix epoch.
    EpochSeconds,
    /// A validated `strftime` pattern.
    Pattern(DatePattern),
}

impl DateFormat {
    /// Build a [`DateFormat::Pattern`] after checking the pattern parses.
    pub fn pattern(pattern: impl Into<String>) -> Result<Self, SchemaError> {
        DatePattern::new(pattern).map(Self::Pattern)
    }
}

/// A `strftime` pattern known to be free of invalid specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern(String);

impl DatePattern {
    fn new(pattern: impl Into<String>) -> Result<Self, SchemaError> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(SchemaError::InvalidDatePattern(pattern));
        }
        Ok(Self(pattern))
    }

    /// The raw pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

thread_local! {
    static ACTIVE_FORMAT: RefCell<DateFormat> = RefCell::new(DateFormat::Iso8601);
}

/// Restores the previous format when an encode scope ends, even on unwind.
struct FormatScope(Option<DateFormat>);

impl Drop for FormatScope {
    fn drop(&mut self) {
        if let Some(previous) = self.0.take() {
            ACTIVE_FORMAT.with(|active| *active.borrow_mut() = previous);
        }
    }
}

/// Run `f` with `format` as the active timestamp encoding on this thread.
pub(crate) fn with_format<R>(format: &DateFormat, f: impl FnOnce() -> R) -> R {
    let previous = ACTIVE_FORMAT.with(|active| active.replace(format.clone()));
    let _scope = FormatScope(Some(previous));
    f()
}

/// A UTC instant as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a UTC datetime.
    #[must_use]
    pub const fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Build from epoch milliseconds.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Interpret an epoch value as seconds, or as milliseconds when it is
    /// too large to be seconds.
    #[must_use]
    pub fn from_epoch(value: Decimal) -> Option<Self> {
        let seconds = if value.abs() > Decimal::from(MAX_EPOCH_SECONDS) {
            value / Decimal::ONE_THOUSAND
        } else {
            value
        };
        let whole = seconds.floor();
        let nanos = ((seconds - whole) * Decimal::from(NANOS_PER_SECOND))
            .trunc()
            .to_u32()?;
        DateTime::from_timestamp(whole.to_i64()?, nanos).map(Self)
    }

    /// The wrapped datetime.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    fn parse_text(text: &str) -> Option<Self> {
        if let Ok(epoch) = Decimal::from_str(text) {
            return Self::from_epoch(epoch);
        }
        if let Ok(at) = DateTime::parse_from_rfc3339(text) {
            return Some(Self(at.with_timezone(&Utc)));
        }
        if let Ok(at) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(Self(at.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Self(naive.and_utc()))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ACTIVE_FORMAT.with(|active| match &*active.borrow() {
            DateFormat::Iso8601 => serializer.collect_str(&self.0.format(ISO_FORMAT)),
            DateFormat::EpochMillis => serializer.serialize_i64(self.0.timestamp_millis()),
            DateFormat::EpochSeconds => serializer.serialize_i64(self.0.timestamp()),
            DateFormat::Pattern(pattern) => {
                serializer.collect_str(&self.0.format(pattern.as_str()))
            }
        })
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

struct TimestampVisitor;

impl Visitor<'_> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("epoch seconds, epoch milliseconds or an ISO-8601 datetime")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Timestamp, E> {
        Timestamp::from_epoch(Decimal::from(value))
            .ok_or_else(|| E::custom(format!("epoch value {value} out of range")))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Timestamp, E> {
        Timestamp::from_epoch(Decimal::from(value))
            .ok_or_else(|| E::custom(format!("epoch value {value} out of range")))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Timestamp, E> {
        Decimal::from_str(&value.to_string())
            .ok()
            .and_then(Timestamp::from_epoch)
            .ok_or_else(|| E::custom(format!("epoch value {value} out of range")))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Timestamp, E> {
        Timestamp::parse_text(value)
            .ok_or_else(|| E::custom(format!("unrecognised datetime {value:?}")))
    }
}
