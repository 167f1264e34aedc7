//! Simulated clock.
//!
//! Queries carry a clock measured in whole minutes since midnight. The value
//! is not wrapped: an arrival after midnight is simply greater than 1440,
//! and only the display folds it back onto a 12-hour dial.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes in one day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Error returned when parsing an invalid clock string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A point on the simulated clock, in minutes since midnight.
///
/// # Examples
///
/// ```
/// use transit_router::domain::Minute;
///
/// let t = Minute::parse("5:30 PM").unwrap();
/// assert_eq!(t.get(), 17 * 60 + 30);
/// assert_eq!(t.to_string(), "5:30 PM");
/// assert_eq!(Minute::parse("17:30").unwrap(), t);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Minute(i64);

impl Minute {
    /// Midnight at the start of the simulated day.
    pub const MIDNIGHT: Minute = Minute(0);

    /// Create a clock value from raw minutes since midnight.
    pub const fn new(minutes: i64) -> Self {
        Self(minutes)
    }

    /// Create a clock value from a 24-hour hour and minute.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self(i64::from(hour * 60 + minute)))
    }

    /// Parse `H:MM AM/PM` (case-insensitive, space optional) or 24-hour `HH:MM`.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        if compact.is_empty() {
            return Err(TimeError::new("empty time string"));
        }

        let time = if compact.ends_with("AM") || compact.ends_with("PM") {
            NaiveTime::parse_from_str(&compact, "%I:%M%p")
                .map_err(|_| TimeError::new("expected H:MM AM/PM"))?
        } else {
            NaiveTime::parse_from_str(&compact, "%H:%M")
                .map_err(|_| TimeError::new("expected HH:MM"))?
        };

        Self::from_hm(time.hour(), time.minute())
    }

    /// Returns the raw minutes since midnight.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Returns the minute within its day, in `0..1440`.
    pub fn minute_of_day(self) -> i64 {
        self.0.rem_euclid(MINUTES_PER_DAY)
    }

    /// Returns how many whole days past the start day this value lies.
    pub fn day_offset(self) -> i64 {
        self.0.div_euclid(MINUTES_PER_DAY)
    }

    /// Returns `self + minutes`, or `None` if the clock would overflow.
    pub fn checked_add(self, minutes: i64) -> Option<Minute> {
        self.0.checked_add(minutes).map(Minute)
    }

    /// Returns the signed number of minutes from `earlier` to `self`.
    pub fn minutes_since(self, earlier: Minute) -> i64 {
        self.0 - earlier.0
    }
}

impl Add<i64> for Minute {
    type Output = Minute;

    fn add(self, minutes: i64) -> Minute {
        Minute(self.0 + minutes)
    }
}

impl Sub for Minute {
    type Output = i64;

    fn sub(self, rhs: Minute) -> i64 {
        self.minutes_since(rhs)
    }
}

impl From<Minute> for f64 {
    fn from(m: Minute) -> f64 {
        m.0 as f64
    }
}

impl fmt::Debug for Minute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Minute({} = {})", self.0, self)
    }
}

impl fmt::Display for Minute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let of_day = self.minute_of_day();
        let hour = of_day / 60;
        let minute = of_day % 60;
        let period = if hour < 12 { "AM" } else { "PM" };
        let dial = match hour % 12 {
            0 => 12,
            h => h,
        };
        write!(f, "{dial}:{minute:02} {period}")
    }
}
