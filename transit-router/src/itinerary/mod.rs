//! Itinerary types.
//!
//! An `Itinerary` is a found route grouped for presentation: consecutive
//! hops on the same mode are merged into one leg, so a ride through five
//! metro stations reads as a single leg rather than five.

mod leg;

use serde::Serialize;

pub use leg::Leg;

use crate::domain::Minute;
use crate::graph::NodeId;
use crate::planner::Path;

/// A complete route from origin to destination, as legs.
///
/// # Invariants
///
/// - Legs are contiguous: each starts at the node where the previous ended
/// - Consecutive legs use different modes
/// - Every hop of the source path belongs to exactly one leg
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    origin: NodeId,
    start_time: Minute,
    legs: Vec<Leg>,
}

impl Itinerary {
    /// Group a path into legs of maximal same-mode runs.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_router::domain::{Minute, Mode};
    /// use transit_router::graph::NodeId;
    /// use transit_router::itinerary::Itinerary;
    /// use transit_router::planner::{Hop, Path};
    ///
    /// let hop = |from, to, mode, dep, arr| Hop {
    ///     from: NodeId(from),
    ///     to: NodeId(to),
    ///     mode,
    ///     departure: Minute::new(dep),
    ///     arrival: Minute::new(arr),
    ///     distance_km: 1.0,
    ///     cost: 5.0,
    /// };
    /// let path = Path::new(
    ///     NodeId(0),
    ///     Minute::new(600),
    ///     vec![
    ///         hop(0, 1, Mode::Metro, 600, 602),
    ///         hop(1, 2, Mode::Metro, 602, 604),
    ///         hop(2, 3, Mode::Car, 604, 606),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// let itinerary = Itinerary::compose(&path);
    /// assert_eq!(itinerary.legs().len(), 2);
    /// assert_eq!(itinerary.legs()[0].nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
    /// assert_eq!(itinerary.total_cost(), 15.0);
    /// ```
    pub fn compose(path: &Path) -> Self {
        let mut legs: Vec<Leg> = Vec::new();
        let mut clock = path.start_time();

        for hop in path.hops() {
            match legs.last_mut() {
                Some(leg) if leg.mode == hop.mode => leg.extend(hop),
                _ => legs.push(Leg::start(hop, clock)),
            }
            clock = hop.arrival;
        }

        Self {
            origin: path.origin(),
            start_time: path.start_time(),
            legs,
        }
    }

    /// Returns all legs in order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// Returns the final node (the origin for an empty itinerary).
    pub fn destination(&self) -> NodeId {
        self.legs.last().map_or(self.origin, Leg::to)
    }

    pub fn start_time(&self) -> Minute {
        self.start_time
    }

    /// Returns the arrival time (the start time for an empty itinerary).
    pub fn arrival(&self) -> Minute {
        self.legs.last().map_or(self.start_time, |l| l.arrival)
    }

    pub fn total_distance_km(&self) -> f64 {
        self.legs.iter().map(|l| l.distance_km).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.legs.iter().map(|l| l.cost).sum()
    }

    /// Returns minutes from the start time to arrival, waits included.
    pub fn total_duration_mins(&self) -> i64 {
        self.arrival() - self.start_time
    }

    /// Returns the total time spent waiting for departures, mid-leg waits
    /// included.
    pub fn total_wait_mins(&self) -> i64 {
        self.legs.iter().map(|l| l.wait_mins).sum()
    }

    /// Returns the number of mode changes (legs - 1, or 0).
    pub fn change_count(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }

    /// Returns every node of the route, origin first.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.origin];
        for leg in &self.legs {
            nodes.extend_from_slice(&leg.nodes[1..]);
        }
        nodes
    }

    /// Returns true if the route has no legs.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}
