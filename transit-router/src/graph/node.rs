//! Graph components - nodes, edges and coordinate keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Mode;
use crate::geo::Coordinate;

/// Fixed-point scale for coordinate keys (six decimal degrees).
const KEY_SCALE: f64 = 1_000_000.0;

/// Index of a node in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Returns the raw index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deduplication key: a coordinate rounded to six decimal degrees.
///
/// Two coordinates with equal keys are the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey {
    lat: i64,
    lon: i64,
}

impl CoordKey {
    pub fn of(coordinate: Coordinate) -> Self {
        Self {
            lat: (coordinate.lat * KEY_SCALE).round() as i64,
            lon: (coordinate.lon * KEY_SCALE).round() as i64,
        }
    }
}

impl From<Coordinate> for CoordKey {
    fn from(coordinate: Coordinate) -> Self {
        Self::of(coordinate)
    }
}

/// A point in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position of the first insertion at this key.
    pub coordinate: Coordinate,
    /// Display name, set only for named stops.
    pub name: Option<String>,
    /// True for a named transit terminus.
    pub is_stop: bool,
}

impl Node {
    /// Name if known, otherwise the coordinate as `(lon, lat)`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.coordinate.to_string(),
        }
    }
}

/// One traversable arc. Each inserted edge yields two of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub distance_km: f64,
    pub mode: Mode,
}
