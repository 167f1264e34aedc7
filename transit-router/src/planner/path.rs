//! Raw search output.
//!
//! A `Path` is the edge-by-edge trace of a found route, before legs are
//! grouped. Hops are guaranteed contiguous: each starts where the previous
//! one ended, and the first starts at the origin.

use serde::Serialize;

use crate::domain::{Minute, Mode};
use crate::graph::NodeId;

/// Error returned when hops do not chain into a path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("hop {index} starts at {found}, expected {expected}")]
pub struct DisconnectedPath {
    pub index: usize,
    pub expected: NodeId,
    pub found: NodeId,
}

/// One traversed edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hop {
    pub from: NodeId,
    pub to: NodeId,
    pub mode: Mode,
    /// Boarding time, after any wait for a timetabled departure.
    pub departure: Minute,
    pub arrival: Minute,
    pub distance_km: f64,
    pub cost: f64,
}

/// A route found by the search, as a sequence of hops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    origin: NodeId,
    start_time: Minute,
    hops: Vec<Hop>,
}

impl Path {
    /// Build a path, checking that the hops chain from `origin`.
    pub fn new(origin: NodeId, start_time: Minute, hops: Vec<Hop>) -> Result<Self, DisconnectedPath> {
        let mut expected = origin;
        for (index, hop) in hops.iter().enumerate() {
            if hop.from != expected {
                return Err(DisconnectedPath {
                    index,
                    expected,
                    found: hop.from,
                });
            }
            expected = hop.to;
        }
        Ok(Self::from_chained(origin, start_time, hops))
    }

    /// Build a path from hops already known to chain.
    pub(crate) fn from_chained(origin: NodeId, start_time: Minute, hops: Vec<Hop>) -> Self {
        Self {
            origin,
            start_time,
            hops,
        }
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// Last node of the path (the origin if there are no hops).
    pub fn destination(&self) -> NodeId {
        self.hops.last().map_or(self.origin, |h| h.to)
    }

    pub fn start_time(&self) -> Minute {
        self.start_time
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// Arrival at the destination (the start time if there are no hops).
    pub fn arrival(&self) -> Minute {
        self.hops.last().map_or(self.start_time, |h| h.arrival)
    }

    pub fn total_cost(&self) -> f64 {
        self.hops.iter().map(|h| h.cost).sum()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.hops.iter().map(|h| h.distance_km).sum()
    }

    /// `(node, arrival)` pairs, starting with `(origin, start_time)`.
    pub fn stops(&self) -> Vec<(NodeId, Minute)> {
        std::iter::once((self.origin, self.start_time))
            .chain(self.hops.iter().map(|h| (h.to, h.arrival)))
            .collect()
    }

    /// Every node on the path, origin first.
    pub fn nodes(&self) -> Vec<NodeId> {
        std::iter::once(self.origin)
            .chain(self.hops.iter().map(|h| h.to))
            .collect()
    }

    /// Mode used to reach each non-initial node.
    pub fn modes(&self) -> Vec<Mode> {
        self.hops.iter().map(|h| h.mode).collect()
    }

    /// Number of hops.
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    /// Returns true if origin and destination coincide.
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}
