//! Temporal value payloads: calendar dates, time of day, timestamps and
//! CQL durations.
//!
//! Wire encodings live in the marshaller; these types hold the decoded
//! host representation (days since epoch, nanos since midnight, millis since
//! epoch, and the (months, days, nanos) duration triple).

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nanoseconds in a day; the exclusive upper bound for [`Time`].
const NANOS_PER_DAY: i64 = 86_400_000_000_000;

/// CQL `date`: a calendar day as signed days since the Unix epoch.
///
/// The wire representation is an unsigned 32-bit value centered on 2^31;
/// the offset math lives in the marshaller.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Date(i32);

impl Date {
    pub fn new(days: i32) -> Self {
        Self(days)
    }

    /// Builds from epoch seconds, flooring toward the containing day.
    pub fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds.div_euclid(86_400) as i32)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::invalid_argument(format!(
                "Invalid date {:04}-{:02}-{:02}",
                year, month, day
            ))
        })?;
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
        Ok(Self((date - epoch).num_days() as i32))
    }

    /// Signed days since the Unix epoch.
    pub fn days(&self) -> i32 {
        self.0
    }

    /// Midnight of this day as epoch seconds.
    pub fn to_epoch_seconds(&self) -> i64 {
        self.0 as i64 * 86_400
    }

    /// Pairs this date with a time of day, yielding epoch seconds.
    pub fn to_date_time(&self, time: &Time) -> i64 {
        self.to_epoch_seconds() + time.nanos() / 1_000_000_000
    }

    fn to_naive(&self) -> Option<NaiveDate> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
        epoch.checked_add_signed(chrono::Duration::days(self.0 as i64))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(date) => write!(
                f,
                "{:04}-{:02}-{:02}",
                date.year(),
                date.month(),
                date.day()
            ),
            None => write!(f, "{}", self.0),
        }
    }
}

/// CQL `time`: nanoseconds since midnight in `[0, 86399999999999]`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Time(i64);

impl Time {
    pub fn new(nanos: i64) -> Result<Self> {
        if !(0..NANOS_PER_DAY).contains(&nanos) {
            return Err(Error::range(format!(
                "value must be between 0 and {}, {} given",
                NANOS_PER_DAY - 1,
                nanos
            )));
        }
        Ok(Self(nanos))
    }

    pub fn nanos(&self) -> i64 {
        self.0
    }

    pub fn hours(&self) -> u32 {
        (self.0 / 3_600_000_000_000) as u32
    }

    pub fn minutes(&self) -> u32 {
        ((self.0 / 60_000_000_000) % 60) as u32
    }

    pub fn seconds(&self) -> u32 {
        ((self.0 / 1_000_000_000) % 60) as u32
    }
}

impl FromStr for Time {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let time = NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map_err(|_| Error::invalid_argument(format!("Invalid time \"{}\"", s)))?;
        Self::new(
            time.num_seconds_from_midnight() as i64 * 1_000_000_000 + time.nanosecond() as i64,
        )
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:09}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.0 % 1_000_000_000
        )
    }
}

/// CQL `timestamp`: milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// Builds from a (seconds, microseconds) pair, the host-language
    /// `microtime` decomposition.
    pub fn from_parts(seconds: i64, microseconds: i64) -> Result<Self> {
        seconds
            .checked_mul(1000)
            .and_then(|ms| ms.checked_add(microseconds / 1000))
            .map(Self)
            .ok_or_else(|| Error::range("Timestamp is out of range"))
    }

    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Whole seconds since the epoch, floored.
    pub fn seconds(&self) -> i64 {
        self.0.div_euclid(1000)
    }

    /// Fractional epoch seconds, the `microtime(true)` rendering.
    pub fn microtime(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// CQL `duration`: a (months, days, nanoseconds) triple.
///
/// All three components must carry the same sign; a duration is either
/// entirely forward or entirely backward in time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration {
    months: i32,
    days: i32,
    nanos: i64,
}

impl Duration {
    pub fn new(months: i32, days: i32, nanos: i64) -> Result<Self> {
        let any_positive = months > 0 || days > 0 || nanos > 0;
        let any_negative = months < 0 || days < 0 || nanos < 0;
        if any_positive && any_negative {
            return Err(Error::range(
                "A duration must have all its components with the same sign",
            ));
        }
        Ok(Self {
            months,
            days,
            nanos,
        })
    }

    pub fn months(&self) -> i32 {
        self.months
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub fn nanos(&self) -> i64 {
        self.nanos
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months == 0 && self.days == 0 && self.nanos == 0 {
            return write!(f, "0s");
        }
        if self.months < 0 || self.days < 0 || self.nanos < 0 {
            write!(f, "-")?;
        }
        let months = self.months.unsigned_abs();
        let days = self.days.unsigned_abs();
        let mut nanos = self.nanos.unsigned_abs();

        if months / 12 > 0 {
            write!(f, "{}y", months / 12)?;
        }
        if months % 12 > 0 {
            write!(f, "{}mo", months % 12)?;
        }
        if days > 0 {
            write!(f, "{}d", days)?;
        }
        for (unit, per) in [
            ("h", 3_600_000_000_000u64),
            ("m", 60_000_000_000),
            ("s", 1_000_000_000),
            ("ms", 1_000_000),
            ("us", 1_000),
            ("ns", 1),
        ] {
            if nanos / per > 0 {
                write!(f, "{}{}", nanos / per, unit)?;
                nanos %= per;
            }
        }
        Ok(())
    }
}
