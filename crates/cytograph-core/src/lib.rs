//! Core extraction pipeline: skeletonized tissue image in, exact
//! planar graph out.
//!
//! The input is an 8-bit raster whose foreground pixels form a
//! 1-pixel-wide skeleton of cell membranes. [`extract`] runs the full
//! pipeline on it:
//!
//! 1. Reject rasters that are not a proper skeleton (2x2 foreground
//!    blocks, dense neighborhoods).
//! 2. Condition the boundary: erase walls clipped by the image border
//!    and keep only segments that bound an enclosed region.
//! 3. Classify every pixel by its 8-neighborhood, trace the skeleton
//!    runs between node pixels, and label the enclosed regions.
//! 4. Build vertices and edges, splice out stub artifacts, order each
//!    vertex's neighbors by angle, and close the faces.
//! 5. Verify the global counts with an Euler-style relation before
//!    returning the graph.
//!
//! Everything is sans-IO: the crate reads a [`GrayImage`] buffer and
//! returns plain data. Loading images and writing reports belong to the
//! callers.

// Lattice coordinates fit comfortably in both i32 and usize; the index
// casts between them are exact.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

mod boundary;
mod check;
mod classify;
mod edge;
mod face;
mod label;
mod order;
mod raster;
mod repair;
mod trace;
mod types;
mod vertex;

pub use classify::PixelClass;
pub use types::{
    Cell, Contour, Diagnostics, Edge, ExtractConfig, ExtractError, GraphSummary, GrayImage, Pt,
    Side, TissueGraph, Vertex,
};

/// Extract the planar cell-topology graph from a skeleton image.
///
/// The image is copied; the caller's buffer is left untouched.
/// Foreground pixels must hold the value 255 and background 0.
///
/// # Errors
///
/// Any defect in the input skeleton or in the resulting topology aborts
/// the frame with the [`ExtractError`] variant naming it; no partial
/// graph is ever returned.
pub fn extract(image: &GrayImage, config: &ExtractConfig) -> Result<TissueGraph, ExtractError> {
    let mut raster = raster::Raster::from_image(image)?;
    raster.check_four_blocks()?;

    let mut diagnostics = Diagnostics::default();
    boundary::condition(&mut raster, &mut diagnostics)?;

    let mut classes = classify::classify(&raster)?;
    let mut contours = trace::trace(&raster, &classes, &mut diagnostics.long_walks)?;
    diagnostics.contours_traced = contours.len();

    let regions = label::assign_regions(&raster, config.min_region_area)?;

    let first_pass = vertex::build_vertices(&raster, &classes, &regions);
    diagnostics.isolated_terminals = first_pass.isolated.len();

    let mut vertices = first_pass.vertices;
    repair::reconnect(
        &raster,
        &mut classes,
        &mut contours,
        &mut vertices,
        &first_pass.isolated,
    )?;
    // Repair rewrites contours and classifications, so the vertex set
    // is rebuilt from scratch.
    let mut vertices = vertex::build_vertices(&raster, &classes, &regions).vertices;

    let edges = edge::build_edges(&raster, &classes, &contours, &vertices)?;
    order::order_neighbors(&mut vertices, &edges);

    let mut cells = face::build_exterior_cells(&vertices)?;
    cells.extend(face::build_interior_cells(
        &vertices,
        &edges,
        regions.cell_count,
    )?);
    face::assign_cell_edges(&mut cells, &edges);
    face::finalize_cells(&mut cells, &vertices)?;

    let summary = summarize(&vertices, &edges, &cells);
    check::verify(&summary)?;

    Ok(TissueGraph {
        vertices,
        edges,
        cells,
        summary,
        diagnostics,
    })
}

fn summarize(vertices: &[Vertex], edges: &[Edge], cells: &[Cell]) -> GraphSummary {
    let exterior_vertices = vertices.iter().filter(|v| v.side == Side::Exterior).count();
    let exterior_edges = edges.iter().filter(|e| e.side == Side::Exterior).count();
    let exterior_cells = cells.iter().filter(|c| c.side == Side::Exterior).count();
    GraphSummary {
        cell_count: cells.len(),
        interior_cells: cells.len() - exterior_cells,
        exterior_cells,
        edge_count: edges.len(),
        interior_edges: edges.len() - exterior_edges,
        exterior_edges,
        vertex_count: vertices.len(),
        interior_vertices: vertices.len() - exterior_vertices,
        exterior_vertices,
        four_way_count: vertices
            .iter()
            .filter(|v| v.class == PixelClass::FourWay)
            .count(),
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use image::{GrayImage, Luma};

    use crate::raster::Raster;

    /// Build a working raster directly from row slices, bypassing image
    /// loading.
    pub(crate) fn raster_from_rows(rows: &[&[u8]]) -> Raster {
        let height = rows.len();
        let width = rows[0].len();
        let mut data = Vec::with_capacity(width * height);
        for row in rows {
            assert_eq!(row.len(), width);
            data.extend_from_slice(row);
        }
        Raster {
            width,
            height,
            data,
        }
    }

    /// A 17x17 tic-tac-toe skeleton: grid lines at rows and columns 2,
    /// 6, 10, and 14, each spanning pixels 2..=14. Conditioning erases
    /// the outline and leaves a `#` with four crossings, eight terminal
    /// tips, and one enclosed center cell.
    pub(crate) fn grid_17() -> GrayImage {
        let mut img = GrayImage::new(17, 17);
        for line in [2, 6, 10, 14] {
            for t in 2..=14 {
                img.put_pixel(line, t, Luma([255]));
                img.put_pixel(t, line, Luma([255]));
            }
        }
        img
    }

    /// The grid with a two-pixel stub poking into the center cell from
    /// the middle of its left wall. The stub's tip is an isolated
    /// terminal and its base a false junction; repair removes both.
    pub(crate) fn grid_17_with_stub() -> GrayImage {
        let mut img = grid_17();
        img.put_pixel(7, 8, Luma([255]));
        img.put_pixel(8, 8, Luma([255]));
        img
    }

    /// A 7x7 plus whose arms run to within one pixel of the border.
    /// Every skeleton pixel faces the exterior, so conditioning erases
    /// the frame completely.
    pub(crate) fn plus_to_border_7() -> GrayImage {
        let mut img = GrayImage::new(7, 7);
        for t in 1..=5 {
            img.put_pixel(3, t, Luma([255]));
            img.put_pixel(t, 3, Luma([255]));
        }
        img
    }
}
