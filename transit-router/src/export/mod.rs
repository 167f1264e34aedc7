//! Route output: KML overlays and plain-text reports.

mod kml;
mod report;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use kml::write_kml;
pub use report::{ReportContext, write_report};

use crate::graph::{Graph, NodeId};
use crate::router::RouteResult;

/// Error writing route output.
#[derive(Debug, thiserror::Error)]
#[error("cannot write {path}: {source}")]
pub struct ExportError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

impl ExportError {
    /// Returns the file that could not be written.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Write a KML file tracing `nodes`, named after the file.
pub fn save_kml(graph: &Graph, nodes: &[NodeId], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    write_file(path, |out| write_kml(graph, nodes, &name, out))
}

/// Write a text report for one routed query.
pub fn save_report(
    graph: &Graph,
    result: &RouteResult,
    context: &ReportContext,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    write_file(path.as_ref(), |out| write_report(graph, result, context, out))
}

/// Write any serializable value as pretty-printed JSON.
pub fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), ExportError> {
    write_file(path.as_ref(), |out| {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)
    })
}

fn write_file(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), ExportError> {
    let wrap = |source| ExportError {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(wrap)?);
    body(&mut out).map_err(wrap)?;
    out.flush().map_err(wrap)
}
