//! Route file ingest.
//!
//! Both road and transit files are headerless comma-separated rows:
//!
//! ```text
//! id, lon1, lat1, lon2, lat2, ..., meta1, meta2
//! ```
//!
//! Coordinate pairs are read from column 1 up to the two trailing metadata
//! columns, stopping at the first pair that does not parse. For transit
//! files the metadata columns are the start and end stop names.

mod error;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};

pub use error::IngestError;

use crate::domain::Mode;
use crate::geo::Coordinate;
use crate::graph::Graph;

/// Road rows shorter than this are skipped.
const MIN_ROAD_COLUMNS: usize = 6;

/// Transit rows shorter than this are skipped.
const MIN_TRANSIT_COLUMNS: usize = 4;

/// Counts from loading one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub edges_added: usize,
}

/// Load a road file, adding a Car edge between consecutive coordinates.
pub fn load_roads(graph: &mut Graph, path: impl AsRef<Path>) -> Result<IngestSummary, IngestError> {
    let path = path.as_ref();
    let summary = read_roads(graph, open(path)?)?;
    info!(
        path = %path.display(),
        rows = summary.rows_read,
        skipped = summary.rows_skipped,
        edges = summary.edges_added,
        nodes = graph.node_count(),
        "loaded roads"
    );
    Ok(summary)
}

/// Load a transit file, adding edges of `mode` along each route.
pub fn load_transit(
    graph: &mut Graph,
    path: impl AsRef<Path>,
    mode: Mode,
) -> Result<IngestSummary, IngestError> {
    let path = path.as_ref();
    let summary = read_transit(graph, open(path)?, mode)?;
    info!(
        path = %path.display(),
        %mode,
        rows = summary.rows_read,
        skipped = summary.rows_skipped,
        edges = summary.edges_added,
        nodes = graph.node_count(),
        "loaded transit routes"
    );
    Ok(summary)
}

/// Read road rows from any reader.
pub fn read_roads<R: Read>(graph: &mut Graph, reader: R) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();

    for (line, record) in records(reader).enumerate() {
        let record = record?;
        summary.rows_read += 1;
        if record.len() < MIN_ROAD_COLUMNS {
            warn!(line = line + 1, columns = record.len(), "skipping short road row");
            summary.rows_skipped += 1;
            continue;
        }

        let coords = coordinates(&record);
        for pair in coords.windows(2) {
            let u = graph.add_waypoint(pair[0]);
            let v = graph.add_waypoint(pair[1]);
            graph.add_edge(u, v, pair[0].distance_km(&pair[1]), Mode::Car)?;
            summary.edges_added += 1;
        }
    }

    Ok(summary)
}

/// Read transit rows of one mode from any reader.
pub fn read_transit<R: Read>(
    graph: &mut Graph,
    reader: R,
    mode: Mode,
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();

    for (line, record) in records(reader).enumerate() {
        let record = record?;
        summary.rows_read += 1;
        if record.len() < MIN_TRANSIT_COLUMNS {
            warn!(line = line + 1, columns = record.len(), "skipping short transit row");
            summary.rows_skipped += 1;
            continue;
        }

        let coords = coordinates(&record);
        if coords.len() < 2 {
            warn!(line = line + 1, points = coords.len(), "skipping transit row without a route");
            summary.rows_skipped += 1;
            continue;
        }

        let n = record.len();
        let start_name = record.get(n - 2).map(str::trim);
        let end_name = record.get(n - 1).map(str::trim);
        graph.add_node(coords[0], start_name, true);
        graph.add_node(coords[coords.len() - 1], end_name, true);

        for pair in coords.windows(2) {
            let u = graph.add_waypoint(pair[0]);
            let v = graph.add_waypoint(pair[1]);
            graph.add_edge(u, v, pair[0].distance_km(&pair[1]), mode)?;
            summary.edges_added += 1;
        }
    }

    Ok(summary)
}

fn open(path: &Path) -> Result<File, IngestError> {
    File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn records<R: Read>(reader: R) -> csv::StringRecordsIntoIter<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
        .into_records()
}

/// Parse `lon, lat` pairs from column 1 up to the metadata columns.
fn coordinates(record: &StringRecord) -> Vec<Coordinate> {
    let end = record.len().saturating_sub(2);
    let mut coords = Vec::new();
    let mut i = 1;
    while i + 1 < end {
        let lon = record.get(i).and_then(|s| s.trim().parse::<f64>().ok());
        let lat = record.get(i + 1).and_then(|s| s.trim().parse::<f64>().ok());
        let (Some(lon), Some(lat)) = (lon, lat) else {
            break;
        };
        coords.push(Coordinate::new(lat, lon));
        i += 2;
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn roads_chain_consecutive_points() {
        let data = "\
r1,90.40,23.70,90.41,23.70,90.42,23.70,primary,2
r2,90.42,23.70,90.42,23.71,residential,1
";
        let mut graph = Graph::new();
        let summary = read_roads(&mut graph, data.as_bytes()).unwrap();

        assert_eq!(
            summary,
            IngestSummary {
                rows_read: 2,
                rows_skipped: 0,
                edges_added: 3
            }
        );
        // The shared point (90.42, 23.70) is one node.
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);

        let a = graph.node_at(Coordinate::new(23.70, 90.40)).unwrap();
        let b = graph.node_at(Coordinate::new(23.70, 90.41)).unwrap();
        let edge = graph.edges(a)[0];
        assert_eq!(edge.target, b);
        assert_eq!(edge.mode, Mode::Car);
        let expected = Coordinate::new(23.70, 90.40).distance_km(&Coordinate::new(23.70, 90.41));
        assert!((edge.distance_km - expected).abs() < 1e-12);
    }

    #[test]
    fn short_road_rows_are_skipped() {
        let data = "r1,90.40,23.70,x,y\nr2\n";
        let mut graph = Graph::new();
        let summary = read_roads(&mut graph, data.as_bytes()).unwrap();
        assert_eq!(summary.rows_skipped, 2);
        assert!(graph.is_empty());
    }

    #[test]
    fn parsing_stops_at_first_bad_pair() {
        let data = "r1,90.40,23.70,90.41,23.70,oops,23.70,90.43,23.70,m,1\n";
        let mut graph = Graph::new();
        let summary = read_roads(&mut graph, data.as_bytes()).unwrap();
        assert_eq!(summary.edges_added, 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn metadata_columns_are_never_coordinates() {
        // The trailing columns are numeric but still metadata.
        let data = "r1,90.40,23.70,90.41,23.70,5,6\n";
        let mut graph = Graph::new();
        read_roads(&mut graph, data.as_bytes()).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node_at(Coordinate::new(6.0, 5.0)).is_none());
    }

    #[test]
    fn transit_names_terminal_stops() {
        let data = "m1,90.36,23.81,90.37,23.80,90.39,23.73, Uttara North , Motijheel \n";
        let mut graph = Graph::new();
        let summary = read_transit(&mut graph, data.as_bytes(), Mode::Metro).unwrap();
        assert_eq!(summary.edges_added, 2);

        let start = graph.node_at(Coordinate::new(23.81, 90.36)).unwrap();
        let middle = graph.node_at(Coordinate::new(23.80, 90.37)).unwrap();
        let end = graph.node_at(Coordinate::new(23.73, 90.39)).unwrap();

        let start = graph.node(start).unwrap();
        assert_eq!(start.name.as_deref(), Some("Uttara North"));
        assert!(start.is_stop);
        assert_eq!(graph.node(end).unwrap().name.as_deref(), Some("Motijheel"));
        assert!(!graph.node(middle).unwrap().is_stop);
        assert!(graph.edges(middle).iter().all(|e| e.mode == Mode::Metro));
    }

    #[test]
    fn transit_rows_need_two_coordinates() {
        let data = "b1,90.36,23.81,A,B\nb2,x,y\nb3,A,B\n";
        let mut graph = Graph::new();
        let summary = read_transit(&mut graph, data.as_bytes(), Mode::BusA).unwrap();
        assert_eq!(summary.rows_read, 3);
        assert_eq!(summary.rows_skipped, 3);
        assert!(graph.is_empty());
    }

    #[test]
    fn transit_stops_upgrade_road_waypoints() {
        let mut graph = Graph::new();
        read_roads(&mut graph, "r,90.36,23.81,90.37,23.80,x,1\n".as_bytes()).unwrap();
        let id = graph.node_at(Coordinate::new(23.81, 90.36)).unwrap();
        assert!(!graph.node(id).unwrap().is_stop);

        read_transit(&mut graph, "t,90.36,23.81,90.39,23.73,Mirpur,Shahbag\n".as_bytes(), Mode::BusB)
            .unwrap();
        assert_eq!(graph.node_at(Coordinate::new(23.81, 90.36)), Some(id));
        assert!(graph.node(id).unwrap().is_stop);
        assert_eq!(graph.label(id), "Mirpur");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "r1,90.40,23.70,90.41,23.70,primary,2").unwrap();

        let mut graph = Graph::new();
        let summary = load_roads(&mut graph, file.path()).unwrap();
        assert_eq!(summary.edges_added, 1);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = load_transit(&mut Graph::new(), &path, Mode::Metro).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }
}
