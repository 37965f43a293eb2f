//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  Each tick also moves a
//! wall-clock `DateTime` forward by a fixed [`TimeIncrement`]:
//!
//!   date_time(tick) = start + tick * increment
//!
//! `DateTime` is whole seconds since the Unix epoch (UTC, no leap seconds).
//! Civil-date conversion uses the days-from-civil algorithm, so no datetime
//! library is needed for the closed set of increments we support.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.  Tick 0 is the episode start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TimeIncrement ─────────────────────────────────────────────────────────────

/// How much wall-clock time one tick represents.
///
/// Only this closed set is supported; anything else is rejected when the run
/// parameters are parsed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeIncrement {
    Daily,
    Hourly,
    HalfHourly,
}

impl TimeIncrement {
    /// Length of one tick in seconds.
    #[inline]
    pub fn secs(self) -> i64 {
        match self {
            TimeIncrement::Daily      => 86_400,
            TimeIncrement::Hourly     => 3_600,
            TimeIncrement::HalfHourly => 1_800,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeIncrement::Daily      => "daily",
            TimeIncrement::Hourly     => "hourly",
            TimeIncrement::HalfHourly => "half-hourly",
        }
    }
}

impl FromStr for TimeIncrement {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim() {
            "daily"       => Ok(TimeIncrement::Daily),
            "hourly"      => Ok(TimeIncrement::Hourly),
            "half-hourly" => Ok(TimeIncrement::HalfHourly),
            other         => Err(CoreError::UnsupportedTimeIncrement(other.to_owned())),
        }
    }
}

impl fmt::Display for TimeIncrement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DateTime ──────────────────────────────────────────────────────────────────

/// A UTC wall-clock instant, stored as seconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTime(i64);

impl DateTime {
    pub const fn from_unix_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub const fn unix_secs(self) -> i64 {
        self.0
    }

    /// Midnight at the start of the given civil date, or `None` if the date
    /// does not exist.
    pub fn from_ymd(year: i64, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self(days_from_civil(year, month, day) * 86_400))
    }

    /// Parse a `YYYY-MM-DD` date into midnight UTC of that day.
    pub fn parse_date(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidDate(s.to_owned());

        let mut parts = s.trim().splitn(3, '-');
        let year: i64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;

        Self::from_ymd(year, month, day).ok_or_else(invalid)
    }

    /// This instant moved forward by one tick of `increment`.
    #[inline]
    pub fn advanced(self, increment: TimeIncrement) -> Self {
        Self(self.0 + increment.secs())
    }

    /// This instant moved forward by `ticks` ticks of `increment`.
    #[inline]
    pub fn advanced_by(self, increment: TimeIncrement, ticks: u64) -> Self {
        Self(self.0 + increment.secs() * ticks as i64)
    }

    /// Civil date `(year, month, day)`.
    pub fn date(self) -> (i64, u32, u32) {
        civil_from_days(self.0.div_euclid(86_400))
    }

    /// Time of day `(hour, minute, second)`.
    pub fn time_of_day(self) -> (u32, u32, u32) {
        let secs = self.0.rem_euclid(86_400) as u32;
        (secs / 3_600, (secs % 3_600) / 60, secs % 60)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (y, mo, d) = self.date();
        let (h, mi, s) = self.time_of_day();
        write!(f, "{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}")
    }
}

// ── Calendar ──────────────────────────────────────────────────────────────────

/// Maps ticks to wall-clock instants for one run.
///
/// `Calendar` is cheap to copy and holds no heap data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    /// Wall-clock instant of tick 0.
    pub start:     DateTime,
    pub increment: TimeIncrement,
}

impl Calendar {
    pub fn new(start: DateTime, increment: TimeIncrement) -> Self {
        Self { start, increment }
    }

    /// Wall-clock instant at the start of `tick`.
    #[inline]
    pub fn date_time_at(&self, tick: Tick) -> DateTime {
        self.start.advanced_by(self.increment, tick.0)
    }
}

// ── Civil-date helpers ────────────────────────────────────────────────────────

fn is_leap_year(y: i64) -> bool {
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

fn days_in_month(y: i64, m: u32) -> u32 {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(y) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}
