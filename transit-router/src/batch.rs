//! Batch query runner.
//!
//! A batch file is JSON naming the route files to load and the queries to
//! answer. Relative paths are resolved against the batch file's directory.
//!
//! ```json
//! {
//!   "roads": "roads.csv",
//!   "transit": [{ "mode": "metro", "path": "metro.csv" }],
//!   "output_dir": "out",
//!   "mode_names": { "bus_a": "Bikalpa Bus", "bus_b": "Uttara Bus" },
//!   "queries": [
//!     {
//!       "name": "evening",
//!       "from": { "lat": 23.7, "lon": 90.4 },
//!       "to": { "lat": 23.8, "lon": 90.4 },
//!       "depart": "5:30 PM",
//!       "deadline": "8:30 PM",
//!       "config": { "objective": "minimize_cost", "timetabled": true }
//!     }
//!   ]
//! }
//! ```
//!
//! Each query writes `<name>.txt`, `<name>.kml` and `<name>.json` into the
//! output directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{Minute, Mode, ModeMap, TimeError};
use crate::export::{self, ExportError, ReportContext};
use crate::geo::Coordinate;
use crate::graph::Graph;
use crate::ingest::{self, IngestError};
use crate::planner::SearchConfig;
use crate::router::{self, RouteError, RouteRequest};

/// Error running a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("cannot read batch file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid batch file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("query name {0:?} cannot be used as a file name")]
    QueryName(String),

    #[error("query {query}: {source}")]
    Time {
        query: String,
        #[source]
        source: TimeError,
    },

    #[error("query {query}: {source}")]
    Route {
        query: String,
        #[source]
        source: RouteError,
    },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// One transit route file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransitFile {
    pub mode: Mode,
    pub path: PathBuf,
}

/// One query of a batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchQuery {
    pub name: String,
    pub from: Coordinate,
    pub to: Coordinate,
    /// Clock string overriding `config.start_time`.
    #[serde(default)]
    pub depart: Option<String>,
    /// Clock string overriding `config.deadline`.
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub config: SearchConfig,
}

impl BatchQuery {
    /// Returns the name, checked for use as an output file stem.
    ///
    /// Path separators and `.`/`..` are rejected so outputs stay inside the
    /// output directory.
    pub fn file_stem(&self) -> Result<&str, BatchError> {
        let name = self.name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(BatchError::QueryName(self.name.clone()));
        }
        Ok(name)
    }

    /// Build the routing request, applying the clock overrides.
    pub fn request(&self) -> Result<RouteRequest, BatchError> {
        let parse = |s: &str| {
            Minute::parse(s).map_err(|source| BatchError::Time {
                query: self.name.clone(),
                source,
            })
        };

        let mut config = self.config.clone();
        if let Some(depart) = &self.depart {
            config.start_time = parse(depart)?;
        }
        if let Some(deadline) = &self.deadline {
            config.deadline = Some(parse(deadline)?);
        }
        Ok(RouteRequest::new(self.from, self.to, config))
    }
}

/// A parsed batch file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchFile {
    #[serde(default)]
    pub roads: Option<PathBuf>,
    #[serde(default)]
    pub transit: Vec<TransitFile>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report names for modes; unnamed modes keep their built-in name.
    #[serde(default)]
    pub mode_names: ModeMap<Option<String>>,
    pub queries: Vec<BatchQuery>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Counts from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub queries: usize,
    pub found: usize,
}

impl BatchFile {
    /// Read and parse a batch file.
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let text = fs::read_to_string(path).map_err(|source| BatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load every route file into a fresh graph.
    pub fn build_graph(&self, base: &Path) -> Result<Graph, BatchError> {
        let mut graph = Graph::new();
        if let Some(roads) = &self.roads {
            ingest::load_roads(&mut graph, base.join(roads))?;
        }
        for file in &self.transit {
            ingest::load_transit(&mut graph, base.join(&file.path), file.mode)?;
        }
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph ready"
        );
        Ok(graph)
    }

    /// Answer every query against `graph`, writing outputs under `base`.
    pub fn run(&self, graph: &Graph, base: &Path) -> Result<BatchSummary, BatchError> {
        for query in &self.queries {
            query.file_stem()?;
        }

        let out_dir = base.join(&self.output_dir);
        fs::create_dir_all(&out_dir).map_err(|source| BatchError::OutputDir {
            path: out_dir.clone(),
            source,
        })?;

        let mut summary = BatchSummary::default();
        for query in &self.queries {
            let stem = query.file_stem()?;
            let request = query.request()?;
            let result = router::route(graph, &request).map_err(|source| BatchError::Route {
                query: query.name.clone(),
                source,
            })?;

            summary.queries += 1;
            if result.found {
                summary.found += 1;
            } else {
                warn!(query = %query.name, "no route found");
            }

            let context = ReportContext::new(query.name.as_str(), request.config.deadline)
                .with_mode_names(&self.mode_names);
            export::save_report(graph, &result, &context, out_dir.join(format!("{stem}.txt")))?;
            export::save_json(&result, out_dir.join(format!("{stem}.json")))?;
            if let Some(itinerary) = &result.itinerary {
                export::save_kml(graph, &itinerary.nodes(), out_dir.join(format!("{stem}.kml")))?;
            }
        }

        info!(
            queries = summary.queries,
            found = summary.found,
            out = %out_dir.display(),
            "batch complete"
        );
        Ok(summary)
    }
}

/// Load a batch file, build its graph and answer its queries.
pub fn run_batch(path: impl AsRef<Path>) -> Result<BatchSummary, BatchError> {
    let path = path.as_ref();
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let batch = BatchFile::load(path)?;
    let graph = batch.build_graph(base)?;
    batch.run(&graph, base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Objective;

    const ROADS: &str = "r1,90.40,23.70,90.40,23.75,primary,2\nr2,90.40,23.75,90.40,23.80,primary,2\n";
    const METRO: &str = "m1,90.40,23.70,90.40,23.80,Motijheel,Uttara\n";

    fn fixture(batch: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("roads.csv"), ROADS).unwrap();
        fs::write(dir.path().join("metro.csv"), METRO).unwrap();
        fs::write(dir.path().join("batch.json"), batch).unwrap();
        dir
    }

    #[test]
    fn query_overrides_clock() {
        let query: BatchQuery = serde_json::from_str(
            r#"{
                "name": "q",
                "from": {"lat": 23.7, "lon": 90.4},
                "to": {"lat": 23.8, "lon": 90.4},
                "depart": "5:30 PM",
                "deadline": "20:30",
                "config": {"objective": "minimize_cost", "timetabled": true}
            }"#,
        )
        .unwrap();

        let request = query.request().unwrap();
        assert_eq!(request.config.start_time, Minute::new(1050));
        assert_eq!(request.config.deadline, Some(Minute::new(1230)));
        assert_eq!(request.config.objective, Objective::MinimizeCost);
        assert!(request.config.timetabled);
    }

    #[test]
    fn bad_clock_names_the_query() {
        let query = BatchQuery {
            name: "late".into(),
            from: Coordinate::new(0.0, 0.0),
            to: Coordinate::new(0.0, 0.0),
            depart: Some("25:99".into()),
            deadline: None,
            config: SearchConfig::default(),
        };
        let err = query.request().unwrap_err();
        assert!(matches!(err, BatchError::Time { .. }));
        assert!(err.to_string().starts_with("query late:"));
    }

    #[test]
    fn runs_queries_and_writes_outputs() {
        let dir = fixture(
            r#"{
                "roads": "roads.csv",
                "transit": [{"mode": "metro", "path": "metro.csv"}],
                "output_dir": "out",
                "mode_names": {"metro": "MRT Line 6"},
                "queries": [
                    {
                        "name": "cheap",
                        "from": {"lat": 23.7, "lon": 90.4},
                        "to": {"lat": 23.8, "lon": 90.4},
                        "depart": "5:50 PM",
                        "config": {"timetabled": true}
                    },
                    {
                        "name": "bus",
                        "from": {"lat": 23.7, "lon": 90.4},
                        "to": {"lat": 23.8, "lon": 90.4},
                        "config": {"allowed": ["bus_a"]}
                    }
                ]
            }"#,
        );

        let summary = run_batch(dir.path().join("batch.json")).unwrap();
        assert_eq!(summary, BatchSummary { queries: 2, found: 1 });

        let out = dir.path().join("out");
        let report = fs::read_to_string(out.join("cheap.txt")).unwrap();
        assert!(report.contains("Source: Motijheel"));
        assert!(report.contains("6:00 PM - "));
        assert!(report.contains(": Ride MRT Line 6 from (90.400000, 23.700000) to (90.400000, 23.800000)."));
        assert!(out.join("cheap.kml").exists());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("cheap.json")).unwrap()).unwrap();
        assert_eq!(json["found"], true);

        let report = fs::read_to_string(out.join("bus.txt")).unwrap();
        assert!(report.ends_with("No route found!\n"));
        assert!(!out.join("bus.kml").exists());
    }

    #[test]
    fn query_names_must_be_plain_file_names() {
        let query = |name: &str| BatchQuery {
            name: name.into(),
            from: Coordinate::new(0.0, 0.0),
            to: Coordinate::new(0.0, 0.0),
            depart: None,
            deadline: None,
            config: SearchConfig::default(),
        };

        assert_eq!(query("evening rush").file_stem().unwrap(), "evening rush");
        for bad in ["", ".", "..", "../x", "a/b", "a\\b", "/tmp/x"] {
            let err = query(bad).file_stem().unwrap_err();
            assert!(matches!(err, BatchError::QueryName(_)), "{bad:?}");
        }
    }

    #[test]
    fn escaping_query_name_writes_nothing() {
        let dir = fixture(
            r#"{
                "roads": "roads.csv",
                "output_dir": "out",
                "queries": [
                    {
                        "name": "fine",
                        "from": {"lat": 23.7, "lon": 90.4},
                        "to": {"lat": 23.8, "lon": 90.4}
                    },
                    {
                        "name": "../escaped",
                        "from": {"lat": 23.7, "lon": 90.4},
                        "to": {"lat": 23.8, "lon": 90.4}
                    }
                ]
            }"#,
        );

        let err = run_batch(dir.path().join("batch.json")).unwrap_err();
        assert!(matches!(err, BatchError::QueryName(ref name) if name == "../escaped"));
        assert!(!dir.path().join("escaped.txt").exists());
        assert!(!dir.path().join("out").join("fine.txt").exists());
    }

    #[test]
    fn missing_route_file_fails() {
        let dir = fixture(r#"{"roads": "nowhere.csv", "queries": []}"#);
        let err = run_batch(dir.path().join("batch.json")).unwrap_err();
        assert!(matches!(err, BatchError::Ingest(IngestError::Io { .. })));
    }

    #[test]
    fn malformed_batch_file_fails() {
        let dir = fixture(r#"{"queries": [{"name": 3}]}"#);
        let err = run_batch(dir.path().join("batch.json")).unwrap_err();
        assert!(matches!(err, BatchError::Parse(_)));
    }
}
