//! Coordinate-to-coordinate routing.
//!
//! Snaps both endpoints to their nearest graph nodes, runs one search and
//! composes the itinerary. This is the query surface the batch runner uses.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::Minute;
use crate::geo::Coordinate;
use crate::graph::{Graph, Snap};
use crate::itinerary::Itinerary;
use crate::planner::{Planner, SearchConfig, SearchError};

/// Error from routing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// The graph has no node to snap an endpoint to
    #[error("no candidate node: the graph is empty")]
    NoCandidateNode,

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// A routing query between two coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from: Coordinate,
    pub to: Coordinate,
    #[serde(default)]
    pub config: SearchConfig,
}

impl RouteRequest {
    pub fn new(from: Coordinate, to: Coordinate, config: SearchConfig) -> Self {
        Self { from, to, config }
    }
}

/// Outcome of a routing query.
///
/// `found == false` means the destination is unreachable under the query's
/// constraints; the snaps are still reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub found: bool,
    pub origin: Snap,
    pub destination: Snap,
    pub itinerary: Option<Itinerary>,
    pub total_distance_km: f64,
    pub total_cost: f64,
    pub arrival: Option<Minute>,
    pub labels_settled: usize,
}

/// Route between the nodes nearest to `request.from` and `request.to`.
///
/// # Errors
///
/// `RouteError::NoCandidateNode` for an empty graph, `RouteError::Search`
/// for an invalid configuration.
pub fn route(graph: &Graph, request: &RouteRequest) -> Result<RouteResult, RouteError> {
    let origin = graph.nearest(request.from).ok_or(RouteError::NoCandidateNode)?;
    let destination = graph.nearest(request.to).ok_or(RouteError::NoCandidateNode)?;

    let result = Planner::new(graph, &request.config).search(origin.node, destination.node)?;
    let itinerary = result.path.as_ref().map(Itinerary::compose);

    info!(
        from = %request.from,
        to = %request.to,
        found = itinerary.is_some(),
        settled = result.labels_settled,
        "routed query"
    );

    Ok(RouteResult {
        found: itinerary.is_some(),
        origin,
        destination,
        total_distance_km: itinerary.as_ref().map_or(0.0, Itinerary::total_distance_km),
        total_cost: itinerary.as_ref().map_or(0.0, Itinerary::total_cost),
        arrival: itinerary.as_ref().map(Itinerary::arrival),
        itinerary,
        labels_settled: result.labels_settled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Mode, ModeSet};

    fn network() -> Graph {
        let mut graph = Graph::new();
        let a = graph.add_node(Coordinate::new(23.70, 90.40), Some("Motijheel"), true);
        let b = graph.add_waypoint(Coordinate::new(23.75, 90.40));
        let c = graph.add_node(Coordinate::new(23.80, 90.40), Some("Uttara"), true);
        graph.add_edge(a, b, 5.0, Mode::Car).unwrap();
        graph.add_edge(b, c, 5.0, Mode::Car).unwrap();
        graph.add_edge(a, c, 10.0, Mode::Metro).unwrap();
        graph
    }

    #[test]
    fn snaps_and_routes() {
        let graph = network();
        let request = RouteRequest::new(
            Coordinate::new(23.701, 90.401),
            Coordinate::new(23.799, 90.399),
            SearchConfig::cheapest(),
        );
        let result = route(&graph, &request).unwrap();

        assert!(result.found);
        assert_eq!(graph.label(result.origin.node), "Motijheel");
        assert_eq!(graph.label(result.destination.node), "Uttara");
        assert!(result.origin.distance_km > 0.0);
        assert_eq!(result.total_cost, 50.0);
        assert_eq!(result.total_distance_km, 10.0);
        let legs = result.itinerary.unwrap().legs().to_vec();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].mode, Mode::Metro);
    }

    #[test]
    fn unreachable_is_not_an_error() {
        let graph = network();
        let config = SearchConfig::cheapest().with_allowed(ModeSet::only(Mode::BusB));
        let request = RouteRequest::new(
            Coordinate::new(23.70, 90.40),
            Coordinate::new(23.80, 90.40),
            config,
        );
        let result = route(&graph, &request).unwrap();

        assert!(!result.found);
        assert!(result.itinerary.is_none());
        assert_eq!(result.arrival, None);
        assert_eq!(result.total_cost, 0.0);
    }

    #[test]
    fn empty_graph_has_no_candidate() {
        let request = RouteRequest::new(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 1.0),
            SearchConfig::default(),
        );
        assert_eq!(
            route(&Graph::new(), &request).unwrap_err(),
            RouteError::NoCandidateNode
        );
    }

    #[test]
    fn search_errors_propagate() {
        let request = RouteRequest::new(
            Coordinate::new(23.70, 90.40),
            Coordinate::new(23.80, 90.40),
            SearchConfig::default().with_allowed(ModeSet::empty()),
        );
        assert!(matches!(
            route(&network(), &request),
            Err(RouteError::Search(SearchError::InvalidConfig(_)))
        ));
    }
}
