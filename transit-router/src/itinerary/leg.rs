//! Leg type.
//!
//! A `Leg` is a maximal run of consecutive hops on the same mode: one drive,
//! or one ride on a transit line between boarding and alighting.

use serde::Serialize;

use crate::domain::{Minute, Mode};
use crate::graph::NodeId;
use crate::planner::Hop;

/// A leg of an itinerary (one mode).
///
/// # Invariants
///
/// - `nodes` has at least two entries: boarding node first, alighting last
/// - `arrival >= departure`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leg {
    pub mode: Mode,
    /// Every node visited on this leg, boarding and alighting included.
    pub nodes: Vec<NodeId>,
    /// Sum of the run's edge distances.
    pub distance_km: f64,
    /// Sum of the run's edge fares.
    pub cost: f64,
    /// Boarding time.
    pub departure: Minute,
    /// Alighting time.
    pub arrival: Minute,
    /// Minutes spent waiting for a departure: at the boarding node, plus
    /// at any intermediate stop where the run waits for the timetable again.
    pub wait_mins: i64,
}

impl Leg {
    /// Start a leg from its first hop, given the clock on reaching `hop.from`.
    pub(crate) fn start(hop: &Hop, ready: Minute) -> Self {
        Self {
            mode: hop.mode,
            nodes: vec![hop.from, hop.to],
            distance_km: hop.distance_km,
            cost: hop.cost,
            departure: hop.departure,
            arrival: hop.arrival,
            wait_mins: hop.departure - ready,
        }
    }

    /// Append a hop on the same mode.
    pub(crate) fn extend(&mut self, hop: &Hop) {
        debug_assert_eq!(hop.mode, self.mode);
        self.nodes.push(hop.to);
        self.distance_km += hop.distance_km;
        self.cost += hop.cost;
        self.wait_mins += hop.departure - self.arrival;
        self.arrival = hop.arrival;
    }

    /// Returns the boarding node.
    pub fn from(&self) -> NodeId {
        self.nodes[0]
    }

    /// Returns the alighting node.
    pub fn to(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Returns the number of edges in this leg.
    pub fn edge_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns minutes from boarding to alighting.
    pub fn duration_mins(&self) -> i64 {
        self.arrival - self.departure
    }
}
