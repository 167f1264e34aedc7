//! Transit timetables.
//!
//! A scheduled mode departs every `interval_mins` minutes from the start of
//! its daily window up to and including the end of the window. Boarding is
//! modelled as waiting at the node for the next departure; there is no
//! per-vehicle state.

use serde::{Deserialize, Serialize};

use crate::domain::Minute;

/// What to do when a rider is inside the window but no departure is left.
///
/// Happens when the last departure has already left and the next grid
/// point falls after the window closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateBoarding {
    /// No departure: the edge is unusable.
    #[default]
    Refuse,
    /// Board immediately at the current minute, as if the last run of the
    /// day were still waiting.
    Immediate,
}

/// Daily timetable of one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Minutes between departures. Zero or less means no timetable.
    pub interval_mins: i64,
    /// First departure of the day.
    pub window_start: Minute,
    /// Last minute at which a departure may leave.
    pub window_end: Minute,
    #[serde(default)]
    pub late_boarding: LateBoarding,
}

impl Schedule {
    /// Create a timetable with the default late-boarding policy.
    pub fn new(interval_mins: i64, window_start: Minute, window_end: Minute) -> Self {
        Self {
            interval_mins,
            window_start,
            window_end,
            late_boarding: LateBoarding::default(),
        }
    }

    /// Returns this schedule with a different late-boarding policy.
    pub fn with_late_boarding(mut self, policy: LateBoarding) -> Self {
        self.late_boarding = policy;
        self
    }

    /// Returns true if riders have to wait for departures at all.
    pub fn is_timetabled(&self) -> bool {
        self.interval_mins > 0
    }

    /// Next departure at or after `now`, or `None` if service is over.
    pub fn next_departure(&self, now: Minute) -> Option<Minute> {
        next_departure(
            now,
            self.interval_mins,
            self.window_start,
            self.window_end,
            self.late_boarding,
        )
    }
}

/// Next departure at or after `now` on a fixed-interval timetable.
///
/// - Before the window opens the rider waits for `start`.
/// - After the window closes there is no departure.
/// - On a grid point the rider boards immediately.
/// - Otherwise the next grid point, if it is still inside the window.
///   If it is not, `policy` decides.
///
/// A non-positive interval means continuous service: `now` is returned.
///
/// # Examples
///
/// ```
/// use transit_router::domain::Minute;
/// use transit_router::schedule::{LateBoarding, next_departure};
///
/// let (start, end) = (Minute::new(360), Minute::new(1380));
/// let next = next_departure(Minute::new(1070), 15, start, end, LateBoarding::Refuse);
/// assert_eq!(next, Some(Minute::new(1080)));
/// ```
pub fn next_departure(
    now: Minute,
    interval_mins: i64,
    start: Minute,
    end: Minute,
    policy: LateBoarding,
) -> Option<Minute> {
    if interval_mins <= 0 {
        return Some(now);
    }
    if now < start {
        return Some(start);
    }
    if now > end {
        return None;
    }

    let runs_so_far = (now - start) / interval_mins;
    let previous = start + runs_so_far * interval_mins;
    if previous == now {
        return Some(now);
    }

    let next = previous + interval_mins;
    if next <= end {
        return Some(next);
    }

    match policy {
        LateBoarding::Refuse => None,
        LateBoarding::Immediate => Some(now),
    }
}
