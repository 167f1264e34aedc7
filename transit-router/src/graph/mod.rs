//! Multimodal network graph.
//!
//! Nodes are geographic points deduplicated by their rounded coordinate;
//! edges are undirected and tagged with a transport mode. Parallel edges
//! between the same pair of nodes are allowed, so a street and a metro
//! line can share both endpoints.
//!
//! A `Graph` is built once and then only read: searches borrow it
//! immutably, so it can be shared between concurrent queries.

mod error;
mod node;

use std::collections::HashMap;

use serde::Serialize;

pub use error::GraphError;
pub use node::{CoordKey, Edge, Node, NodeId};

use crate::domain::Mode;
use crate::geo::Coordinate;

/// Result of snapping a coordinate onto the graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snap {
    /// Nearest node.
    pub node: NodeId,
    /// Distance from the query point to that node, in kilometres.
    pub distance_km: f64,
}

/// The network: nodes, their coordinate index and adjacency lists.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    adjacency: Vec<Vec<Edge>>,
    index: HashMap<CoordKey, NodeId>,
    edge_count: usize,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or return the existing node with the same key.
    ///
    /// A later insertion at an existing key may set a new non-empty name and
    /// may promote the node to a stop; it never clears either.
    pub fn add_node(&mut self, coordinate: Coordinate, name: Option<&str>, is_stop: bool) -> NodeId {
        let key = CoordKey::of(coordinate);
        let id = match self.index.get(&key) {
            Some(&id) => id,
            None => {
                let id = NodeId(self.nodes.len());
                self.nodes.push(Node {
                    coordinate,
                    name: None,
                    is_stop: false,
                });
                self.adjacency.push(Vec::new());
                self.index.insert(key, id);
                id
            }
        };

        let node = &mut self.nodes[id.0];
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            node.name = Some(name.to_string());
        }
        if is_stop {
            node.is_stop = true;
        }
        id
    }

    /// Insert an unnamed interior waypoint.
    pub fn add_waypoint(&mut self, coordinate: Coordinate) -> NodeId {
        self.add_node(coordinate, None, false)
    }

    /// Insert an edge, creating the arcs `u -> v` and `v -> u`.
    ///
    /// Self-loops and duplicate edges are accepted. Distances must be
    /// non-negative for searches to be correct; that is not checked here.
    pub fn add_edge(
        &mut self,
        u: NodeId,
        v: NodeId,
        distance_km: f64,
        mode: Mode,
    ) -> Result<(), GraphError> {
        self.check(u)?;
        self.check(v)?;

        self.adjacency[u.0].push(Edge {
            target: v,
            distance_km,
            mode,
        });
        self.adjacency[v.0].push(Edge {
            target: u,
            distance_km,
            mode,
        });
        self.edge_count += 1;
        Ok(())
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Returns the outgoing arcs of a node (empty for unknown ids).
    pub fn edges(&self, id: NodeId) -> &[Edge] {
        self.adjacency.get(id.0).map_or(&[], Vec::as_slice)
    }

    /// Returns the node whose key matches `coordinate`, if any.
    pub fn node_at(&self, coordinate: Coordinate) -> Option<NodeId> {
        self.index.get(&CoordKey::of(coordinate)).copied()
    }

    /// Returns true if `id` was issued by this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of inserted (undirected) edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Coordinate of a node.
    pub fn coordinate(&self, id: NodeId) -> Option<Coordinate> {
        self.node(id).map(|n| n.coordinate)
    }

    /// Display label of a node: its name, or its coordinate.
    pub fn label(&self, id: NodeId) -> String {
        self.node(id).map_or_else(|| id.to_string(), Node::label)
    }

    /// Snap a coordinate to the nearest node by exhaustive scan.
    ///
    /// Ties go to the earliest inserted node. Returns `None` for an empty
    /// graph.
    pub fn nearest(&self, coordinate: Coordinate) -> Option<Snap> {
        let mut best: Option<Snap> = None;
        for (id, node) in self.nodes() {
            let d = coordinate.distance_km(&node.coordinate);
            if best.is_none_or(|b| d < b.distance_km) {
                best = Some(Snap {
                    node: id,
                    distance_km: d,
                });
            }
        }
        best
    }

    fn check(&self, id: NodeId) -> Result<(), GraphError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon)
    }

    #[test]
    fn same_key_same_node() {
        let mut graph = Graph::new();
        let a = graph.add_waypoint(at(23.8, 90.4));
        let b = graph.add_waypoint(at(23.800_000_2, 90.399_999_9));
        let c = graph.add_waypoint(at(23.81, 90.4));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node_at(at(23.8, 90.4)), Some(a));
    }

    #[test]
    fn name_and_stop_only_upgrade() {
        let mut graph = Graph::new();
        let id = graph.add_node(at(1.0, 2.0), Some("Mirpur 10"), true);

        // Re-inserting as an unnamed waypoint keeps both.
        assert_eq!(graph.add_node(at(1.0, 2.0), None, false), id);
        assert_eq!(graph.add_node(at(1.0, 2.0), Some(""), false), id);
        let node = graph.node(id).unwrap();
        assert_eq!(node.name.as_deref(), Some("Mirpur 10"));
        assert!(node.is_stop);

        let other = graph.add_waypoint(at(3.0, 4.0));
        assert!(!graph.node(other).unwrap().is_stop);
        graph.add_node(at(3.0, 4.0), Some("Agargaon"), true);
        let node = graph.node(other).unwrap();
        assert_eq!(node.name.as_deref(), Some("Agargaon"));
        assert!(node.is_stop);
    }

    #[test]
    fn edges_are_mirrored() {
        let mut graph = Graph::new();
        let a = graph.add_waypoint(at(0.0, 0.0));
        let b = graph.add_waypoint(at(0.0, 0.01));
        graph.add_edge(a, b, 1.5, Mode::Metro).unwrap();

        assert_eq!(
            graph.edges(a),
            &[Edge {
                target: b,
                distance_km: 1.5,
                mode: Mode::Metro
            }]
        );
        assert_eq!(
            graph.edges(b),
            &[Edge {
                target: a,
                distance_km: 1.5,
                mode: Mode::Metro
            }]
        );
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn parallel_edges_and_self_loops_allowed() {
        let mut graph = Graph::new();
        let a = graph.add_waypoint(at(0.0, 0.0));
        let b = graph.add_waypoint(at(0.0, 0.01));
        graph.add_edge(a, b, 1.0, Mode::Car).unwrap();
        graph.add_edge(a, b, 1.0, Mode::Metro).unwrap();
        graph.add_edge(a, b, 1.0, Mode::Car).unwrap();
        graph.add_edge(a, a, 0.0, Mode::Car).unwrap();

        assert_eq!(graph.edges(a).len(), 5);
        assert_eq!(graph.edges(b).len(), 3);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn unknown_node_rejected() {
        let mut graph = Graph::new();
        let a = graph.add_waypoint(at(0.0, 0.0));
        let err = graph.add_edge(a, NodeId(9), 1.0, Mode::Car).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode(NodeId(9)));
        assert!(graph.edges(a).is_empty());
        assert!(graph.edges(NodeId(9)).is_empty());
    }

    #[test]
    fn nearest_scans_all_nodes() {
        let mut graph = Graph::new();
        assert_eq!(graph.nearest(at(0.0, 0.0)), None);

        let far = graph.add_waypoint(at(10.0, 10.0));
        let near = graph.add_waypoint(at(0.1, 0.1));
        let snap = graph.nearest(at(0.0, 0.0)).unwrap();
        assert_eq!(snap.node, near);
        assert!((snap.distance_km - at(0.0, 0.0).distance_km(&at(0.1, 0.1))).abs() < 1e-12);
        assert_ne!(snap.node, far);
    }

    #[test]
    fn nearest_ties_go_to_first_inserted() {
        let mut graph = Graph::new();
        let first = graph.add_waypoint(at(0.0, 0.01));
        let _second = graph.add_waypoint(at(0.0, -0.01));
        assert_eq!(graph.nearest(at(0.0, 0.0)).unwrap().node, first);
    }

    #[test]
    fn labels() {
        let mut graph = Graph::new();
        let named = graph.add_node(at(23.7, 90.39), Some("Shahbag"), true);
        let plain = graph.add_waypoint(at(23.75, 90.4));
        assert_eq!(graph.label(named), "Shahbag");
        assert_eq!(graph.label(plain), "(90.400000, 23.750000)");
        assert_eq!(graph.label(NodeId(42)), "#42");
    }
}
