//! Ingest error types.

use std::path::PathBuf;

use crate::graph::GraphError;

/// Error loading route files into a graph.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
