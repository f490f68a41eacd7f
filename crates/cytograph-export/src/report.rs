//! Plain-text graph report and chord geometry listing.
//!
//! The report opens with the global counts, then lists every vertex,
//! edge, and cell, one per line, in id order. Coordinates are written in
//! mathematical orientation (`y` negated) with the crop offset added
//! back, so they line up with the uncropped source frame.
//!
//! The chord geometry listing emits one gnuplot-style block per boundary
//! chord: the chord length on a `#` comment line, the two endpoints on
//! the following lines, and a blank separator.

use std::fmt::Write as _;

use cytograph_core::{GraphSummary, Pt, Side, TissueGraph};

/// Errors from the report serializers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The graph's summary counts fail the planarity relation; the
    /// structure is not a valid extraction result and is refused rather
    /// than written out.
    #[error("inconsistent graph counts (vertices={vertices}, edges={edges}, cells={cells})")]
    InconsistentCounts {
        vertices: usize,
        edges: usize,
        cells: usize,
    },
}

/// The same count relation the extraction pipeline enforces: after
/// discounting what the open boundary chains contribute, the interior
/// graph must balance its junction degrees and satisfy Euler's formula.
fn counts_are_consistent(s: &GraphSummary) -> bool {
    let tv = s.vertex_count as i64 - 2 * s.exterior_cells as i64;
    let te = s.edge_count as i64 - 2 * s.exterior_cells as i64;
    let tc = s.cell_count as i64 - s.exterior_cells as i64;
    let f = s.four_way_count as i64;

    (tv == 0 && te == 0 && tc == 0 && f == 0) || (2 * te == 3 * tv + f && tv - te + tc == 1)
}

/// Serialize the graph into the plain-text report.
///
/// `offset` is the top-left corner of the crop window the graph was
/// extracted from; it is added back to every vertex coordinate.
///
/// # Errors
///
/// Returns [`ExportError::InconsistentCounts`] when the summary counts
/// fail the planarity relation.
pub fn graph_report(graph: &TissueGraph, offset: Pt) -> Result<String, ExportError> {
    let s = &graph.summary;
    if !counts_are_consistent(s) {
        return Err(ExportError::InconsistentCounts {
            vertices: s.vertex_count,
            edges: s.edge_count,
            cells: s.cell_count,
        });
    }

    let mut out = String::new();
    let _ = writeln!(out, "### C_NUM {}", s.cell_count);
    let _ = writeln!(out, "###  IN_CNUM {}", s.interior_cells);
    let _ = writeln!(out, "###  EX_CNUM {}", s.exterior_cells);
    let _ = writeln!(out, "### E_NUM {}", s.edge_count);
    let _ = writeln!(out, "###  IN_E_NUM {}", s.interior_edges);
    let _ = writeln!(out, "###  EX_E_NUM {}", s.exterior_edges);
    let _ = writeln!(out, "### V_NUM {}", s.vertex_count);
    let _ = writeln!(out, "###  IN_V_NUM {}", s.interior_vertices);
    let _ = writeln!(out, "###  EX_V_NUM {}", s.exterior_vertices);

    for v in &graph.vertices {
        let x = f64::from(v.pos.x + offset.x);
        let y = -f64::from(v.pos.y + offset.y);
        let _ = write!(out, "V[{}] {x:.6} {y:.6}", v.id);
        if v.side == Side::Exterior {
            out.push_str(" Ext");
        }
        out.push('\n');
    }
    out.push('\n');

    for e in &graph.edges {
        let _ = write!(out, "E[{}] {} {}", e.id, e.vertices[0], e.vertices[1]);
        if e.side == Side::Exterior {
            out.push_str(" Ext");
        }
        out.push('\n');
    }
    out.push('\n');

    for c in &graph.cells {
        let _ = write!(out, "C[{}] {} :", c.id, c.vertices.len());
        for &vid in &c.vertices {
            let _ = write!(out, " {vid}");
        }
        if c.side == Side::Exterior {
            out.push_str(" Ext");
        }
        out.push('\n');
    }
    out.push('\n');

    Ok(out)
}

/// Serialize the boundary chords as a gnuplot-ready listing.
///
/// Chord endpoints are written in the crop window's own coordinates
/// (`y` negated, no offset); the listing is meant for quick visual
/// inspection next to the cropped frame.
#[must_use]
pub fn chord_geometry(graph: &TissueGraph) -> String {
    let mut out = String::new();
    for e in graph.edges.iter().filter(|e| e.side == Side::Exterior) {
        let _ = writeln!(out, "#{:.6}", e.chord_length);
        for p in e.ends {
            let _ = writeln!(out, "{:.6} {:.6}", f64::from(p.x), -f64::from(p.y));
        }
        out.push('\n');
    }
    out
}
