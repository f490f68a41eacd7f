//! Euler-style consistency check over the completed graph.
//!
//! For a valid planar tissue graph, discounting the two vertices, two
//! edges, and one cell that every open boundary chain contributes, the
//! interior graph must satisfy both the trivalent-junction balance
//! `2*te == 3*tv + f` (each four-way crossing relaxes it by one) and
//! Euler's relation `tv - te + tc == 1`.

use crate::types::{ExtractError, GraphSummary};

/// Verify the global counts of a completed extraction.
///
/// An empty interior graph (all discounted counts zero and no four-way
/// crossings) passes trivially; an entirely erased frame is a valid,
/// empty result.
///
/// # Errors
///
/// Returns [`ExtractError::InconsistentCounts`] when either relation
/// fails.
pub(crate) fn verify(summary: &GraphSummary) -> Result<(), ExtractError> {
    let v = summary.vertex_count as i64;
    let e = summary.edge_count as i64;
    let c = summary.cell_count as i64;
    let ex = summary.exterior_cells as i64;
    let f = summary.four_way_count as i64;

    let tv = v - 2 * ex;
    let te = e - 2 * ex;
    let tc = c - ex;

    if tv == 0 && te == 0 && tc == 0 && f == 0 {
        return Ok(());
    }
    if 2 * te == 3 * tv + f && tv - te + tc == 1 {
        return Ok(());
    }
    Err(ExtractError::InconsistentCounts {
        vertices: summary.vertex_count,
        edges: summary.edge_count,
        cells: summary.cell_count,
        exterior: summary.exterior_cells,
        four_way: summary.four_way_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(v: usize, e: usize, c: usize, ex: usize, f: usize) -> GraphSummary {
        GraphSummary {
            cell_count: c,
            interior_cells: c - ex,
            exterior_cells: ex,
            edge_count: e,
            interior_edges: e.saturating_sub(ex),
            exterior_edges: ex,
            vertex_count: v,
            interior_vertices: v.saturating_sub(ex),
            exterior_vertices: ex,
            four_way_count: f,
        }
    }

    #[test]
    fn four_way_grid_counts_are_consistent() {
        // 12 vertices, 12 edges, 9 cells: 8 boundary chains plus one
        // enclosed cell bounded by four crossings.
        assert!(verify(&summary(12, 12, 9, 8, 4)).is_ok());
    }

    #[test]
    fn trivalent_component_is_consistent() {
        // Two junctions joined by three parallel walls: v=2, e=3, c=2.
        assert!(verify(&summary(2, 3, 2, 0, 0)).is_ok());
    }

    #[test]
    fn empty_graph_passes_trivially() {
        assert!(verify(&summary(0, 0, 0, 0, 0)).is_ok());
    }

    #[test]
    fn off_by_one_edge_count_is_rejected() {
        assert!(matches!(
            verify(&summary(12, 13, 9, 8, 4)),
            Err(ExtractError::InconsistentCounts { .. })
        ));
    }
}
