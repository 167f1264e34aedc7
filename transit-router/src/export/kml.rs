//! KML line overlay.

use std::io::{self, Write};

use crate::graph::{Graph, NodeId};

/// Write a KML document with one placemark tracing `nodes` in order.
///
/// Coordinates are written `lon,lat,0` with six decimals. Unknown node ids
/// are skipped.
pub fn write_kml<W: Write>(graph: &Graph, nodes: &[NodeId], name: &str, out: &mut W) -> io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<kml xmlns="http://earth.google.com/kml/2.1">"#)?;
    writeln!(out, "<Document>")?;
    writeln!(out, "<Placemark>")?;
    writeln!(out, "<name>{}</name>", escape(name))?;
    writeln!(out, "<LineString>")?;
    writeln!(out, "<tessellate>1</tessellate>")?;
    writeln!(out, "<coordinates>")?;
    for c in nodes.iter().filter_map(|&id| graph.coordinate(id)) {
        writeln!(out, "{:.6},{:.6},0", c.lon, c.lat)?;
    }
    writeln!(out, "</coordinates>")?;
    writeln!(out, "</LineString>")?;
    writeln!(out, "</Placemark>")?;
    writeln!(out, "</Document>")?;
    writeln!(out, "</kml>")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
