//! Face building: close vertices and edges into cells.
//!
//! Interior cells are recovered by chaining the edges registered to
//! each labeled region into a cycle and normalizing its orientation.
//! Exterior cells are the open boundary chains of each skeleton
//! component, walked from terminal tip to terminal tip by always taking
//! the next neighbor after the arrival direction.

use std::collections::HashMap;

use geo::{Area, Centroid, LineString, Polygon};

use crate::types::{Cell, Edge, ExtractError, Pt, Side, Vertex};

/// Convert a lattice point to a `geo::Coord`, flipping `y` into the
/// standard mathematical orientation.
const fn pt_to_coord(p: Pt) -> geo::Coord<f64> {
    geo::Coord {
        x: p.x as f64,
        y: -(p.y as f64),
    }
}

/// Walk the outer boundary chain starting from each exterior vertex.
///
/// # Errors
///
/// - [`ExtractError::ExteriorStartDegree`] when a starting exterior
///   vertex does not have exactly one neighbor.
/// - [`ExtractError::MissingWalkOrigin`] when a visited vertex does not
///   list the vertex the walk arrived from.
/// - [`ExtractError::DanglingInteriorVertex`] when the walk steps onto
///   an interior dead end.
/// - [`ExtractError::RunawayBoundaryWalk`] when the walk visits more
///   vertices than the graph holds.
pub(crate) fn build_exterior_cells(vertices: &[Vertex]) -> Result<Vec<Cell>, ExtractError> {
    let mut cells = Vec::new();
    for start in vertices.iter().filter(|v| v.side == Side::Exterior) {
        if start.neighbors.len() != 1 {
            return Err(ExtractError::ExteriorStartDegree {
                at: start.pos,
                degree: start.neighbors.len(),
            });
        }
        let mut chain = vec![start.id];
        let mut prev = start.id;
        let mut cur = start.neighbors[0];
        let mut hops = 0usize;
        while vertices[cur].side == Side::Interior {
            chain.push(cur);
            let here = &vertices[cur];
            let Some(arrived) = here.neighbors.iter().position(|&n| n == prev) else {
                return Err(ExtractError::MissingWalkOrigin { at: here.pos });
            };
            if here.neighbors.len() == 1 {
                return Err(ExtractError::DanglingInteriorVertex { at: here.pos });
            }
            let out = (arrived + 1) % here.neighbors.len();
            prev = cur;
            cur = here.neighbors[out];
            hops += 1;
            if hops > vertices.len() {
                return Err(ExtractError::RunawayBoundaryWalk { at: start.pos });
            }
        }
        chain.push(cur);
        cells.push(Cell {
            id: 0,
            side: Side::Exterior,
            vertices: chain,
            edges: Vec::new(),
            area: 0.0,
            centroid: (0.0, 0.0),
        });
    }
    Ok(cells)
}

/// Close each labeled region's edges into an interior cell cycle.
///
/// Cells are emitted in region-label order. Cycles are normalized to
/// counterclockwise orientation (in y-flipped coordinates) and the
/// duplicate closing vertex is dropped.
///
/// # Errors
///
/// Returns [`ExtractError::OpenCellCycle`] when a region's edges do not
/// chain back to the starting vertex.
pub(crate) fn build_interior_cells(
    vertices: &[Vertex],
    edges: &[Edge],
    cell_count: usize,
) -> Result<Vec<Cell>, ExtractError> {
    // Register each interior edge with every cell its two endpoints
    // share; region labels start at 2.
    let mut per_cell: Vec<Vec<usize>> = vec![Vec::new(); cell_count];
    for e in edges {
        let a = &vertices[e.vertices[0]];
        let b = &vertices[e.vertices[1]];
        if a.side != Side::Interior || b.side != Side::Interior {
            continue;
        }
        for &cell_id in &a.cells {
            if b.cells.contains(&cell_id) {
                if let Some(ring) = per_cell.get_mut((cell_id as usize).wrapping_sub(2)) {
                    ring.push(e.id);
                }
            }
        }
    }

    let mut cells = Vec::new();
    for ring in &per_cell {
        let Some((&first, rest)) = ring.split_first() else {
            continue;
        };
        let mut chain = vec![edges[first].vertices[0], edges[first].vertices[1]];
        let mut tip = edges[first].vertices[1];
        let mut used = vec![false; rest.len()];

        // Greedy chaining: keep appending whichever remaining edge
        // continues from the current tip until nothing fits.
        loop {
            let mut progressed = false;
            for (k, &eid) in rest.iter().enumerate() {
                if used[k] {
                    continue;
                }
                let [ea, eb] = edges[eid].vertices;
                let next = if ea == tip {
                    eb
                } else if eb == tip {
                    ea
                } else {
                    continue;
                };
                tip = next;
                chain.push(next);
                used[k] = true;
                progressed = true;
            }
            if !progressed {
                break;
            }
        }

        if chain[0] != chain[chain.len() - 1] {
            return Err(ExtractError::OpenCellCycle {
                first: vertices[chain[0]].pos,
                last: vertices[chain[chain.len() - 1]].pos,
            });
        }
        if shoelace_sum(&chain, vertices) < 0.0 {
            chain.reverse();
        }
        chain.pop();

        cells.push(Cell {
            id: 0,
            side: Side::Interior,
            vertices: chain,
            edges: Vec::new(),
            area: 0.0,
            centroid: (0.0, 0.0),
        });
    }
    Ok(cells)
}

/// Twice the signed area of the vertex chain, wrap segment included,
/// with `y` flipped.
fn shoelace_sum(chain: &[usize], vertices: &[Vertex]) -> f64 {
    let mut sum = 0.0;
    for i in 0..chain.len() {
        let a = pt_to_coord(vertices[chain[i]].pos);
        let b = pt_to_coord(vertices[chain[(i + 1) % chain.len()]].pos);
        sum += a.x.mul_add(b.y, -(b.x * a.y));
    }
    sum
}

/// Fill each cell's edge list by looking up the edge between every pair
/// of consecutive bounding vertices. The wrap pair of an open exterior
/// chain matches no edge and is skipped.
pub(crate) fn assign_cell_edges(cells: &mut [Cell], edges: &[Edge]) {
    let mut by_pair: HashMap<(usize, usize), usize> = HashMap::new();
    for e in edges {
        let [a, b] = e.vertices;
        by_pair.entry((a.min(b), a.max(b))).or_insert(e.id);
    }
    for cell in cells {
        cell.edges.clear();
        let n = cell.vertices.len();
        for j in 0..n {
            let a = cell.vertices[j];
            let b = cell.vertices[(j + 1) % n];
            if let Some(&eid) = by_pair.get(&(a.min(b), a.max(b))) {
                cell.edges.push(eid);
            }
        }
    }
}

/// Assign dense cell ids and compute each cell's area and centroid.
///
/// # Errors
///
/// Returns [`ExtractError::NegativeArea`] when a cell's signed area is
/// negative after orientation normalization.
pub(crate) fn finalize_cells(cells: &mut [Cell], vertices: &[Vertex]) -> Result<(), ExtractError> {
    for (i, cell) in cells.iter_mut().enumerate() {
        cell.id = i;
        let ring: LineString<f64> = cell
            .vertices
            .iter()
            .map(|&v| pt_to_coord(vertices[v].pos))
            .collect();
        let polygon = Polygon::new(ring, vec![]);
        let area = polygon.signed_area();
        if area < 0.0 {
            return Err(ExtractError::NegativeArea {
                cell: i,
                area,
                at: vertices[cell.vertices[0]].pos,
            });
        }
        cell.area = area;
        cell.centroid = polygon.centroid().map_or((0.0, 0.0), |c| (c.x(), c.y()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::condition;
    use crate::classify::classify;
    use crate::edge::build_edges;
    use crate::label::assign_regions;
    use crate::order::order_neighbors;
    use crate::raster::Raster;
    use crate::test_fixtures::grid_17;
    use crate::trace::trace;
    use crate::types::Diagnostics;
    use crate::vertex::build_vertices;

    fn grid_graph() -> (Vec<Vertex>, Vec<Edge>, usize) {
        let mut raster = Raster::from_image(&grid_17()).unwrap();
        let mut diag = Diagnostics::default();
        condition(&mut raster, &mut diag).unwrap();
        let classes = classify(&raster).unwrap();
        let contours = trace(&raster, &classes, &mut diag.long_walks).unwrap();
        let regions = assign_regions(&raster, 4).unwrap();
        let mut set = build_vertices(&raster, &classes, &regions);
        let edges = build_edges(&raster, &classes, &contours, &set.vertices).unwrap();
        order_neighbors(&mut set.vertices, &edges);
        (set.vertices, edges, regions.cell_count)
    }

    #[test]
    fn grid_center_cell_closes_counterclockwise() {
        let (vertices, edges, cell_count) = grid_graph();
        let cells = build_interior_cells(&vertices, &edges, cell_count).unwrap();
        assert_eq!(cells.len(), 1);
        let cell = &cells[0];
        assert_eq!(cell.vertices.len(), 4);
        assert!(shoelace_sum(&cell.vertices, &vertices) > 0.0);
    }

    #[test]
    fn grid_boundary_walks_reach_the_far_tips() {
        let (vertices, _, _) = grid_graph();
        let cells = build_exterior_cells(&vertices).unwrap();
        assert_eq!(cells.len(), 8);
        for cell in &cells {
            let first = &vertices[cell.vertices[0]];
            let last = &vertices[cell.vertices[cell.vertices.len() - 1]];
            assert_eq!(first.side, Side::Exterior);
            assert_eq!(last.side, Side::Exterior);
            assert_ne!(first.id, last.id);
            for &mid in &cell.vertices[1..cell.vertices.len() - 1] {
                assert_eq!(vertices[mid].side, Side::Interior);
            }
        }
    }

    #[test]
    fn grid_cells_finalize_with_positive_areas() {
        let (vertices, edges, cell_count) = grid_graph();
        let mut cells = build_exterior_cells(&vertices).unwrap();
        cells.extend(build_interior_cells(&vertices, &edges, cell_count).unwrap());
        assign_cell_edges(&mut cells, &edges);
        finalize_cells(&mut cells, &vertices).unwrap();

        assert_eq!(cells.len(), 9);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.id, i);
            assert!(cell.area >= 0.0);
        }

        let center = cells.iter().find(|c| c.side == Side::Interior).unwrap();
        assert!((center.area - 16.0).abs() < 1e-12);
        assert_eq!(center.centroid, (8.0, -8.0));
        assert_eq!(center.edges.len(), 4);

        // Open exterior chains list one edge fewer than vertices.
        for cell in cells.iter().filter(|c| c.side == Side::Exterior) {
            assert_eq!(cell.edges.len(), cell.vertices.len() - 1);
        }
    }
}
