//! Plain-text route report.

use std::io::{self, Write};

use crate::domain::{Minute, Mode, ModeMap};
use crate::graph::{Graph, NodeId};
use crate::router::RouteResult;

/// Query details printed around the legs.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    pub name: String,
    pub deadline: Option<Minute>,
    /// Name printed for each mode in leg lines.
    pub mode_names: ModeMap<String>,
}

impl ReportContext {
    /// Create a context using the built-in mode names.
    pub fn new(name: impl Into<String>, deadline: Option<Minute>) -> Self {
        Self {
            name: name.into(),
            deadline,
            mode_names: ModeMap::uniform(()).map(|mode, _| mode.name().to_string()),
        }
    }

    /// Returns this context with the given modes renamed.
    pub fn with_mode_names(mut self, names: &ModeMap<Option<String>>) -> Self {
        for (mode, name) in names.iter() {
            if let Some(name) = name {
                self.mode_names[mode] = name.clone();
            }
        }
        self
    }

    fn mode_name(&self, mode: Mode) -> &str {
        &self.mode_names[mode]
    }
}

impl Default for ReportContext {
    fn default() -> Self {
        Self::new(String::new(), None)
    }
}

/// Write one line per leg followed by totals.
///
/// ```text
/// 6:00 PM - 6:10 PM, Cost: Tk 50.00: Ride Metro from (90.400000, 23.700000) to (90.400000, 23.800000).
/// ```
pub fn write_report<W: Write>(
    graph: &Graph,
    result: &RouteResult,
    context: &ReportContext,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Query: {}", context.name)?;
    for (role, snap) in [("Source", &result.origin), ("Destination", &result.destination)] {
        writeln!(
            out,
            "{role}: {} ({:.2} km from the requested point)",
            graph.label(snap.node),
            snap.distance_km
        )?;
    }
    writeln!(out)?;

    let Some(itinerary) = result.itinerary.as_ref().filter(|_| result.found) else {
        return match context.deadline {
            Some(_) => writeln!(out, "No route found within deadline!"),
            None => writeln!(out, "No route found!"),
        };
    };

    for leg in itinerary.legs() {
        writeln!(
            out,
            "{} - {}, Cost: Tk {:.2}: {} {} from {} to {}.",
            leg.departure,
            leg.arrival,
            leg.cost,
            leg.mode.verb(),
            context.mode_name(leg.mode),
            position(graph, leg.from()),
            position(graph, leg.to()),
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Total Distance: {:.2} km", itinerary.total_distance_km())?;
    writeln!(out, "Total Cost: Tk {:.2}", itinerary.total_cost())?;
    writeln!(out, "Arrival Time: {}", itinerary.arrival())?;
    if let Some(deadline) = context.deadline {
        let met = if itinerary.arrival() <= deadline { "YES" } else { "NO" };
        writeln!(out, "Deadline Met: {met}")?;
    }
    Ok(())
}

fn position(graph: &Graph, id: NodeId) -> String {
    graph
        .coordinate(id)
        .map_or_else(|| id.to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;
    use crate::geo::Coordinate;
    use crate::planner::SearchConfig;
    use crate::router::{RouteRequest, route};

    fn network() -> Graph {
        let mut graph = Graph::new();
        let a = graph.add_node(Coordinate::new(23.7, 90.4), Some("Motijheel"), true);
        let b = graph.add_waypoint(Coordinate::new(23.75, 90.4));
        let c = graph.add_node(Coordinate::new(23.8, 90.4), Some("Uttara"), true);
        graph.add_edge(a, b, 5.0, Mode::Car).unwrap();
        graph.add_edge(b, c, 5.0, Mode::Metro).unwrap();
        graph
    }

    fn render(graph: &Graph, config: SearchConfig, deadline: Option<Minute>) -> String {
        let request = RouteRequest::new(
            Coordinate::new(23.7, 90.4),
            Coordinate::new(23.8, 90.4),
            config,
        );
        let result = route(graph, &request).unwrap();
        let context = ReportContext::new("Q1", deadline);
        let mut out = Vec::new();
        write_report(graph, &result, &context, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn legs_and_totals() {
        let graph = network();
        let text = render(&graph, SearchConfig::cheapest_departing(Minute::new(1070)), None);

        let expected = "\
Query: Q1
Source: Motijheel (0.00 km from the requested point)
Destination: Uttara (0.00 km from the requested point)

5:50 PM - 6:00 PM, Cost: Tk 100.00: Drive Car from (90.400000, 23.700000) to (90.400000, 23.750000).
6:00 PM - 6:10 PM, Cost: Tk 25.00: Ride Metro from (90.400000, 23.750000) to (90.400000, 23.800000).

Total Distance: 10.00 km
Total Cost: Tk 125.00
Arrival Time: 6:10 PM
";
        assert_eq!(text, expected);
    }

    #[test]
    fn renamed_modes_appear_in_leg_lines() {
        let graph = network();
        let request = RouteRequest::new(
            Coordinate::new(23.7, 90.4),
            Coordinate::new(23.8, 90.4),
            SearchConfig::cheapest(),
        );
        let result = route(&graph, &request).unwrap();

        let names = ModeMap {
            metro: Some("MRT Line 6".to_string()),
            ..ModeMap::default()
        };
        let context = ReportContext::new("Q1", None).with_mode_names(&names);
        assert_eq!(context.mode_names.car, "Car");

        let mut out = Vec::new();
        write_report(&graph, &result, &context, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(": Drive Car from "));
        assert!(text.contains(": Ride MRT Line 6 from (90.400000, 23.750000)"));
    }

    #[test]
    fn deadline_verdict() {
        let graph = network();
        let config = SearchConfig::cheapest_arriving_by(Minute::new(1070), Minute::new(1100));
        let text = render(&graph, config, Some(Minute::new(1100)));
        assert!(text.ends_with("Arrival Time: 6:10 PM\nDeadline Met: YES\n"));
    }

    #[test]
    fn unreachable_routes() {
        let graph = network();
        let config = SearchConfig::cheapest_arriving_by(Minute::new(1070), Minute::new(1075));
        let text = render(&graph, config, Some(Minute::new(1075)));
        assert!(text.ends_with("\nNo route found within deadline!\n"));

        let config = SearchConfig::cheapest().with_allowed(crate::domain::ModeSet::only(Mode::Car));
        let text = render(&graph, config, None);
        assert!(text.ends_with("\nNo route found!\n"));
    }
}
