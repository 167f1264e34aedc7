//! Search configuration for the route planner.

use serde::{Deserialize, Serialize};

use crate::domain::{Minute, Mode, ModeMap, ModeSet};
use crate::schedule::Schedule;

use super::search::SearchError;

/// Quantity the search minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Total kilometres; ties broken by arrival time.
    MinimizeDistance,
    /// Total fare; ties broken by arrival time.
    #[default]
    MinimizeCost,
    /// Arrival time; ties broken by fare. Always follows timetables.
    MinimizeArrivalTime,
}

/// Which labels a node keeps during search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dominance {
    /// `BestPerNode` where it is exact, `Pareto` otherwise.
    #[default]
    Auto,
    /// One label per node: the best (primary, secondary) pair seen so far.
    BestPerNode,
    /// Every label not weakly dominated on both keys. Exact for
    /// fare-under-deadline queries, where a pricier but earlier arrival may
    /// be the only one that makes the deadline.
    Pareto,
}

/// Configuration parameters for a route search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// What to minimize.
    pub objective: Objective,

    /// Wait for timetabled departures. Ignored (always on) when minimizing
    /// arrival time.
    pub timetabled: bool,

    /// Modes the route may use.
    pub allowed: ModeSet,

    /// Fare per kilometre of each mode.
    pub cost_per_km: ModeMap<f64>,

    /// Average speed of each mode (km/h).
    pub speed_kmh: ModeMap<f64>,

    /// Timetable of each mode. `None` means always available.
    pub schedules: ModeMap<Option<Schedule>>,

    /// Clock at the origin.
    pub start_time: Minute,

    /// Latest acceptable arrival at any node, destination included.
    pub deadline: Option<Minute>,

    /// Label retention policy.
    pub dominance: Dominance,
}

impl SearchConfig {
    /// Shortest driving distance.
    pub fn shortest_distance() -> Self {
        Self {
            objective: Objective::MinimizeDistance,
            allowed: ModeSet::only(Mode::Car),
            ..Self::default()
        }
    }

    /// Cheapest fare, treating every mode as instantly available.
    pub fn cheapest() -> Self {
        Self {
            objective: Objective::MinimizeCost,
            timetabled: false,
            ..Self::default()
        }
    }

    /// Cheapest fare leaving at `start`, waiting for timetabled departures.
    pub fn cheapest_departing(start: Minute) -> Self {
        Self {
            objective: Objective::MinimizeCost,
            timetabled: true,
            start_time: start,
            ..Self::default()
        }
    }

    /// Earliest arrival leaving at `start`.
    pub fn fastest_departing(start: Minute) -> Self {
        Self {
            objective: Objective::MinimizeArrivalTime,
            timetabled: true,
            start_time: start,
            ..Self::default()
        }
    }

    /// Cheapest fare leaving at `start` and arriving no later than `deadline`.
    pub fn cheapest_arriving_by(start: Minute, deadline: Minute) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::cheapest_departing(start)
        }
    }

    /// Returns this config restricted to `allowed` modes.
    pub fn with_allowed(mut self, allowed: ModeSet) -> Self {
        self.allowed = allowed;
        self
    }

    /// Returns this config with a different retention policy.
    pub fn with_dominance(mut self, dominance: Dominance) -> Self {
        self.dominance = dominance;
        self
    }

    /// Returns this config with a deadline (or none).
    pub fn with_deadline(mut self, deadline: Option<Minute>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Returns true if the search waits for timetabled departures.
    pub fn follows_timetables(&self) -> bool {
        self.timetabled || self.objective == Objective::MinimizeArrivalTime
    }

    /// Resolve `Dominance::Auto` for this query.
    ///
    /// One label per node is exact when the clock cannot change what is
    /// reachable (no timetables and no deadline), and when the clock is the
    /// primary key, since waiting for a departure never lets a later label
    /// overtake an earlier one.
    pub fn effective_dominance(&self) -> Dominance {
        match self.dominance {
            Dominance::Auto => {
                let clock_free = !self.follows_timetables() && self.deadline.is_none();
                if clock_free || self.objective == Objective::MinimizeArrivalTime {
                    Dominance::BestPerNode
                } else {
                    Dominance::Pareto
                }
            }
            explicit => explicit,
        }
    }

    /// Timetable to wait for on `mode`, if any.
    ///
    /// Car never has one, and neither does a mode with a non-positive interval.
    pub fn schedule_for(&self, mode: Mode) -> Option<&Schedule> {
        if !mode.is_transit() {
            return None;
        }
        self.schedules[mode].as_ref().filter(|s| s.is_timetabled())
    }

    /// Whole minutes to travel `distance_km` on `mode`, rounded down.
    ///
    /// Saturates at `i64::MAX` when the speed is too small for the result
    /// to fit.
    pub fn travel_mins(&self, mode: Mode, distance_km: f64) -> i64 {
        // `as` saturates, and maps NaN to 0
        (distance_km / self.speed_kmh[mode] * 60.0).floor() as i64
    }

    /// Check that every allowed mode has a usable speed, fare and timetable.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.allowed.is_empty() {
            return Err(SearchError::InvalidConfig("no modes allowed".to_string()));
        }

        for mode in self.allowed.iter() {
            let speed = self.speed_kmh[mode];
            if !(speed.is_finite() && speed > 0.0) {
                return Err(SearchError::InvalidConfig(format!(
                    "{mode} speed must be positive, got {speed}"
                )));
            }

            let cost = self.cost_per_km[mode];
            if !(cost.is_finite() && cost >= 0.0) {
                return Err(SearchError::InvalidConfig(format!(
                    "{mode} cost per km must be non-negative, got {cost}"
                )));
            }

            if let Some(schedule) = self.schedule_for(mode) {
                if schedule.window_end < schedule.window_start {
                    return Err(SearchError::InvalidConfig(format!(
                        "{mode} window ends ({}) before it starts ({})",
                        schedule.window_end, schedule.window_start
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let daytime = |interval| {
            Some(Schedule::new(
                interval,
                Minute::new(6 * 60),  // 6:00 AM
                Minute::new(23 * 60), // 11:00 PM
            ))
        };

        Self {
            objective: Objective::default(),
            timetabled: false,
            allowed: ModeSet::all(),
            cost_per_km: ModeMap::new(20.0, 5.0, 7.0, 7.0),
            speed_kmh: ModeMap::uniform(30.0),
            schedules: ModeMap::new(None, daytime(15), daytime(15), daytime(15)),
            start_time: Minute::MIDNIGHT,
            deadline: None,
            dominance: Dominance::default(),
        }
    }
}
