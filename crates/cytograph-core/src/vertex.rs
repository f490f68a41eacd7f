//! Vertex building: turn node pixels into graph vertices.
//!
//! A node pixel becomes a vertex described by the set of cells its
//! 8-neighborhood touches. Node pixels touching nothing but membrane
//! and a single cell are spurious stubs left by segmentation noise;
//! they are set aside as isolated terminals for the repair pass instead
//! of becoming vertices.

use std::collections::BTreeSet;

use crate::classify::PixelClass;
use crate::label::Regions;
use crate::raster::Raster;
use crate::types::{Side, Vertex};

/// Membrane region id.
const MEMBRANE: u32 = 0;
/// Exterior background region id.
const EXTERIOR_BG: u32 = 1;

/// Vertices plus the node pixels deferred to repair.
#[derive(Debug, Clone)]
pub(crate) struct VertexSet {
    /// Vertices with dense ids, interior first.
    pub(crate) vertices: Vec<Vertex>,
    /// Flat raster indices of isolated terminals.
    pub(crate) isolated: Vec<usize>,
}

/// Build the vertex set from classified pixels and labeled regions.
pub(crate) fn build_vertices(
    raster: &Raster,
    classes: &[PixelClass],
    regions: &Regions,
) -> VertexSet {
    let mut vertices: Vec<Vertex> = Vec::new();
    let mut isolated: Vec<usize> = Vec::new();

    for y in 1..raster.height - 1 {
        for x in 1..raster.width - 1 {
            let id = raster.idx(x, y);
            if !classes[id].is_node() {
                continue;
            }
            let adjacent: BTreeSet<u32> = raster
                .neighbor_offsets()
                .iter()
                .map(|off| regions.cell_ids[id.wrapping_add_signed(*off)])
                .collect();

            // A terminal touching only membrane and one enclosed cell
            // is a stub poking into that cell, not a real vertex.
            let cells: Vec<u32> = adjacent.into_iter().collect();
            if cells.len() == 2 && cells[0] == MEMBRANE && cells[1] != EXTERIOR_BG {
                isolated.push(id);
                continue;
            }

            let cells: Vec<u32> = cells
                .into_iter()
                .filter(|&c| c != MEMBRANE && c != EXTERIOR_BG)
                .collect();
            let side = if cells.is_empty() {
                Side::Exterior
            } else {
                Side::Interior
            };
            vertices.push(Vertex {
                id: 0,
                pos: raster.pt(id),
                cells,
                class: classes[id],
                side,
                neighbors: Vec::new(),
                incident_edges: Vec::new(),
            });
        }
    }

    finalize_ids(&mut vertices);
    VertexSet { vertices, isolated }
}

/// Sort interior vertices before exterior ones (stable, so scan order
/// is preserved within each group) and assign dense ids.
pub(crate) fn finalize_ids(vertices: &mut [Vertex]) {
    vertices.sort_by_key(|v| v.cells.is_empty());
    for (i, v) in vertices.iter_mut().enumerate() {
        v.id = i;
    }
}
