//! Label-correcting route search.
//!
//! One Dijkstra-style search serves every query kind. A label is a partial
//! route ending at a node with a clock and an accumulated fare; labels are
//! ordered by a composite key whose primary component depends on the
//! objective (distance, fare or clock) and whose secondary component breaks
//! ties (clock, clock or fare).
//!
//! Labels live in an arena and point at their predecessor by index, so
//! pushing a label costs O(1) regardless of route length. The route is
//! rebuilt once, by walking predecessors back from the destination.
//!
//! Every edge strictly increases the key: fares and distances never
//! decrease and each hop takes at least one minute. The first time the
//! destination is settled its label is therefore optimal under the active
//! dominance policy.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, trace};

use crate::domain::{Minute, Mode};
use crate::graph::{Graph, NodeId};

use super::config::{Dominance, Objective, SearchConfig};
use super::path::{Hop, Path};

/// Error from route search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// Parameters that would make the search meaningless
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// Origin or destination not in the graph
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

/// Result of one search.
///
/// An unreachable destination is a normal outcome: `path` is `None`.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best route found, if the destination is reachable.
    pub path: Option<Path>,

    /// Labels taken off the queue and expanded.
    pub labels_settled: usize,

    /// Labels admitted to the queue.
    pub labels_pushed: usize,
}

impl SearchResult {
    /// Returns true if a route was found.
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }
}

/// A label at the moment it is settled, as reported to observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettledLabel {
    pub node: NodeId,
    pub clock: Minute,
    pub cost: f64,
    pub distance_km: f64,
    /// Value of the objective's primary key.
    pub primary: f64,
    /// Value of the objective's tie-break key.
    pub secondary: f64,
}

type LabelId = usize;

/// Back-reference from a label to the one it was relaxed from.
#[derive(Debug, Clone, Copy)]
struct Parent {
    label: LabelId,
    mode: Mode,
    departure: Minute,
    distance_km: f64,
    cost: f64,
}

#[derive(Debug, Clone, Copy)]
struct Label {
    node: NodeId,
    clock: Minute,
    cost: f64,
    distance_km: f64,
    parent: Option<Parent>,
}

/// Composite priority: primary, then secondary.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Key {
    primary: f64,
    secondary: f64,
}

impl Key {
    fn order(&self, other: &Key) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then_with(|| self.secondary.total_cmp(&other.secondary))
    }

    fn dominates(&self, other: &Key) -> bool {
        self.primary <= other.primary && self.secondary <= other.secondary
    }
}

#[derive(Clone, Copy)]
struct State {
    key: Key,
    label: LabelId,
}

// Min-heap by key, then by insertion order (reversed for BinaryHeap)
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .order(&self.key)
            .then_with(|| other.label.cmp(&self.label))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

/// Per-node record of the labels still worth expanding.
enum Frontier {
    BestPerNode(Vec<Option<Key>>),
    Pareto(Vec<Vec<(Key, LabelId)>>),
}

impl Frontier {
    fn new(dominance: Dominance, node_count: usize) -> Self {
        match dominance {
            Dominance::Pareto => Frontier::Pareto(vec![Vec::new(); node_count]),
            Dominance::BestPerNode | Dominance::Auto => {
                Frontier::BestPerNode(vec![None; node_count])
            }
        }
    }

    /// Record a candidate label. Returns false if the node already holds a
    /// label at least as good.
    fn admit(&mut self, node: NodeId, key: Key, id: LabelId) -> bool {
        match self {
            Frontier::BestPerNode(best) => {
                let slot = &mut best[node.0];
                if slot.is_some_and(|b| b.order(&key) != Ordering::Greater) {
                    return false;
                }
                *slot = Some(key);
                true
            }
            Frontier::Pareto(sets) => {
                let set = &mut sets[node.0];
                if set.iter().any(|(k, _)| k.dominates(&key)) {
                    return false;
                }
                set.retain(|(k, _)| !key.dominates(k));
                set.push((key, id));
                true
            }
        }
    }

    /// Returns true if a popped label was superseded after it was queued.
    fn is_stale(&self, node: NodeId, key: Key, id: LabelId) -> bool {
        match self {
            Frontier::BestPerNode(best) => {
                best[node.0].is_some_and(|b| b.order(&key) == Ordering::Less)
            }
            Frontier::Pareto(sets) => !sets[node.0].iter().any(|&(_, l)| l == id),
        }
    }
}

/// Route planner over a borrowed graph.
///
/// The planner holds no mutable state; every search allocates its own
/// label arena and queue, so one planner can serve many queries.
pub struct Planner<'a> {
    graph: &'a Graph,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(graph: &'a Graph, config: &'a SearchConfig) -> Self {
        Self { graph, config }
    }

    /// Search for the best route from `origin` to `destination`.
    pub fn search(&self, origin: NodeId, destination: NodeId) -> Result<SearchResult, SearchError> {
        self.search_observed(origin, destination, |_| {})
    }

    /// Search, reporting every settled label to `observe` in pop order.
    pub fn search_observed(
        &self,
        origin: NodeId,
        destination: NodeId,
        mut observe: impl FnMut(&SettledLabel),
    ) -> Result<SearchResult, SearchError> {
        self.config.validate()?;
        for node in [origin, destination] {
            if !self.graph.contains(node) {
                return Err(SearchError::UnknownNode(node));
            }
        }

        let run = Run::new(self.graph, self.config);
        Ok(run.execute(origin, destination, &mut observe))
    }
}

/// State of one search.
struct Run<'a> {
    graph: &'a Graph,
    config: &'a SearchConfig,
    labels: Vec<Label>,
    heap: BinaryHeap<State>,
    frontier: Frontier,
    settled: usize,
}

impl<'a> Run<'a> {
    fn new(graph: &'a Graph, config: &'a SearchConfig) -> Self {
        Self {
            graph,
            config,
            labels: Vec::new(),
            heap: BinaryHeap::new(),
            frontier: Frontier::new(config.effective_dominance(), graph.node_count()),
            settled: 0,
        }
    }

    fn execute(
        mut self,
        origin: NodeId,
        destination: NodeId,
        observe: &mut impl FnMut(&SettledLabel),
    ) -> SearchResult {
        let start = self.config.start_time;
        debug!(
            %origin,
            %destination,
            objective = ?self.config.objective,
            timetabled = self.config.follows_timetables(),
            %start,
            deadline = ?self.config.deadline,
            dominance = ?self.config.effective_dominance(),
            "starting route search"
        );

        if self.config.deadline.is_some_and(|d| start > d) {
            debug!("start time is already past the deadline");
            return self.finish(None);
        }

        self.push(Label {
            node: origin,
            clock: start,
            cost: 0.0,
            distance_km: 0.0,
            parent: None,
        });

        while let Some(State { key, label: id }) = self.heap.pop() {
            let label = self.labels[id];
            if self.frontier.is_stale(label.node, key, id) {
                continue;
            }

            self.settled += 1;
            observe(&SettledLabel {
                node: label.node,
                clock: label.clock,
                cost: label.cost,
                distance_km: label.distance_km,
                primary: key.primary,
                secondary: key.secondary,
            });
            trace!(
                node = %label.node,
                clock = %label.clock,
                cost = label.cost,
                "settled label"
            );

            if label.node == destination {
                let path = self.reconstruct(id, origin);
                return self.finish(Some(path));
            }

            self.relax(id);
        }

        self.finish(None)
    }

    fn finish(self, path: Option<Path>) -> SearchResult {
        match &path {
            Some(p) => debug!(
                hops = p.len(),
                cost = p.total_cost(),
                arrival = %p.arrival(),
                settled = self.settled,
                pushed = self.labels.len(),
                "route found"
            ),
            None => debug!(
                settled = self.settled,
                pushed = self.labels.len(),
                "destination unreachable"
            ),
        }

        SearchResult {
            path,
            labels_settled: self.settled,
            labels_pushed: self.labels.len(),
        }
    }

    /// Expand every usable edge out of a settled label.
    fn relax(&mut self, id: LabelId) {
        let graph = self.graph;
        let config = self.config;
        let label = self.labels[id];
        let timetabled = config.follows_timetables();

        for edge in graph.edges(label.node) {
            let mode = edge.mode;
            if !config.allowed.contains(mode) {
                continue;
            }

            let departure = match config.schedule_for(mode).filter(|_| timetabled) {
                Some(schedule) => match schedule.next_departure(label.clock) {
                    Some(t) => t,
                    None => continue,
                },
                None => label.clock,
            };

            // A hop always takes at least one minute. One that runs past the
            // end of the clock is unusable.
            let travel = config.travel_mins(mode, edge.distance_km).max(1);
            let Some(arrival) = departure.checked_add(travel) else {
                trace!(node = %edge.target, %mode, travel, "travel time overflows the clock");
                continue;
            };
            if config.deadline.is_some_and(|d| arrival > d) {
                continue;
            }

            let cost = edge.distance_km * config.cost_per_km[mode];
            self.push(Label {
                node: edge.target,
                clock: arrival,
                cost: label.cost + cost,
                distance_km: label.distance_km + edge.distance_km,
                parent: Some(Parent {
                    label: id,
                    mode,
                    departure,
                    distance_km: edge.distance_km,
                    cost,
                }),
            });
        }
    }

    /// Queue a label unless its node already holds one at least as good.
    fn push(&mut self, label: Label) {
        let key = self.key_of(&label);
        let id = self.labels.len();
        if self.frontier.admit(label.node, key, id) {
            self.labels.push(label);
            self.heap.push(State { key, label: id });
        }
    }

    fn key_of(&self, label: &Label) -> Key {
        let clock = f64::from(label.clock);
        match self.config.objective {
            Objective::MinimizeDistance => Key {
                primary: label.distance_km,
                secondary: clock,
            },
            Objective::MinimizeCost => Key {
                primary: label.cost,
                secondary: clock,
            },
            Objective::MinimizeArrivalTime => Key {
                primary: clock,
                secondary: label.cost,
            },
        }
    }

    fn reconstruct(&self, id: LabelId, origin: NodeId) -> Path {
        let mut hops = Vec::new();
        let mut current = id;
        while let Some(parent) = self.labels[current].parent {
            let label = &self.labels[current];
            hops.push(Hop {
                from: self.labels[parent.label].node,
                to: label.node,
                mode: parent.mode,
                departure: parent.departure,
                arrival: label.clock,
                distance_km: parent.distance_km,
                cost: parent.cost,
            });
            current = parent.label;
        }
        hops.reverse();
        Path::from_chained(origin, self.config.start_time, hops)
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
