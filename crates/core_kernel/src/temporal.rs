//! Calendar and clock handling
//!
//! Rental dates are calendar dates in the agency's local timezone, while
//! "now" comes from an injectable [`Clock`] so that rules such as
//! "pickup must be in the future" can be tested deterministically.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Timezone the agency operates in
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Morocco, where every pickup location lives
    pub fn casablanca() -> Self {
        Self(chrono_tz::Africa::Casablanca)
    }

    /// Calendar date of `instant` in this timezone
    pub fn today(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }

    /// Resolves a local wall-clock date and time to UTC
    ///
    /// Ambiguous local times (clocks turned back) resolve to the earliest
    /// instant; times skipped by a clock change are rejected.
    pub fn at_local(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, TemporalError> {
        date.and_time(time)
            .and_local_timezone(self.0)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| TemporalError::NonexistentLocalTime(format!("{} {}", date, time)))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::casablanca()
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Local time does not exist: {0}")]
    NonexistentLocalTime(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// A rental period of whole calendar dates, start strictly before end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start >= end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Calendar days between start and end
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Returns true if the two periods share at least one night
    ///
    /// A return on the same date another rental starts does not overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Source of the current instant
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Returns a clock moved forward by `by`
    pub fn advanced(&self, by: Duration) -> Self {
        Self(self.0 + by)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub type SharedClock = Arc<dyn Clock>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_rejects_same_day() {
        assert!(DateRange::new(date(2025, 3, 1), date(2025, 3, 1)).is_err());
        assert!(DateRange::new(date(2025, 3, 2), date(2025, 3, 1)).is_err());
    }

    #[test]
    fn test_date_range_days() {
        let range = DateRange::new(date(2025, 3, 1), date(2025, 3, 4)).unwrap();
        assert_eq!(range.days(), 3);
    }

    #[test]
    fn test_back_to_back_rentals_do_not_overlap() {
        let first = DateRange::new(date(2025, 3, 1), date(2025, 3, 4)).unwrap();
        let second = DateRange::new(date(2025, 3, 4), date(2025, 3, 6)).unwrap();
        let third = DateRange::new(date(2025, 3, 3), date(2025, 3, 5)).unwrap();

        assert!(!first.overlaps(&second));
        assert!(first.overlaps(&third));
        assert!(third.overlaps(&second));
    }

    #[test]
    fn test_today_uses_local_calendar() {
        // 23:30 UTC on Dec 31 is already Jan 1 in UTC+1
        let tz = Timezone::casablanca();
        let instant = Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(tz.today(instant), date(2025, 1, 1));
    }

    #[test]
    fn test_timezone_parse() {
        assert!("Africa/Casablanca".parse::<Timezone>().is_ok());
        assert!(matches!(
            "Mars/Olympus".parse::<Timezone>(),
            Err(TemporalError::UnknownTimezone(_))
        ));
    }
}
