//! Edge building: resolve contours into graph edges.
//!
//! Each final contour becomes one edge between the vertices at its two
//! endpoints, carrying the full polyline plus the chord geometry the
//! downstream reports use.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::classify::PixelClass;
use crate::raster::Raster;
use crate::types::{Contour, Edge, ExtractError, Pt, Side, Vertex};

/// Build the edge set from the final contours.
///
/// Edges are sorted exterior-first (stable) and given dense ids.
///
/// # Errors
///
/// - [`ExtractError::EndpointWithoutVertex`] when a contour endpoint
///   has no matching vertex.
/// - [`ExtractError::ExteriorCountMismatch`] when the exterior vertex
///   and exterior edge counts differ; each boundary chain end must pair
///   a terminal vertex with exactly one exterior edge.
pub(crate) fn build_edges(
    raster: &Raster,
    classes: &[PixelClass],
    contours: &[Contour],
    vertices: &[Vertex],
) -> Result<Vec<Edge>, ExtractError> {
    let by_pos: HashMap<Pt, usize> = vertices.iter().map(|v| (v.pos, v.id)).collect();

    let mut edges: Vec<Edge> = Vec::with_capacity(contours.len());
    for contour in contours {
        let first = contour[0];
        let last = contour[contour.len() - 1];
        let endpoint = |p: Pt| {
            by_pos
                .get(&p)
                .copied()
                .ok_or(ExtractError::EndpointWithoutVertex { at: p })
        };
        let v0 = endpoint(first)?;
        let v1 = endpoint(last)?;

        let class_at =
            |p: Pt| classes[raster.idx(p.x as usize, p.y as usize)];
        let side = if class_at(first) == PixelClass::Terminal
            || class_at(last) == PixelClass::Terminal
        {
            Side::Exterior
        } else {
            Side::Interior
        };

        let mut angle = -f64::from(first.y - last.y).atan2(f64::from(first.x - last.x));
        if angle < 0.0 {
            angle += PI;
        }

        edges.push(Edge {
            id: 0,
            vertices: [v0, v1],
            ends: [first, last],
            side,
            chord_length: first.distance(last),
            chord_angle: angle,
            polyline: contour.clone(),
        });
    }

    edges.sort_by_key(|e| e.side == Side::Interior);
    for (i, e) in edges.iter_mut().enumerate() {
        e.id = i;
    }

    let exterior_vertices = vertices.iter().filter(|v| v.side == Side::Exterior).count();
    let exterior_edges = edges.iter().filter(|e| e.side == Side::Exterior).count();
    if exterior_vertices != exterior_edges {
        return Err(ExtractError::ExteriorCountMismatch {
            vertices: exterior_vertices,
            edges: exterior_edges,
        });
    }
    Ok(edges)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::condition;
    use crate::classify::classify;
    use crate::label::assign_regions;
    use crate::test_fixtures::grid_17;
    use crate::trace::trace;
    use crate::types::Diagnostics;
    use crate::vertex::build_vertices;

    fn grid_edges() -> (Vec<Vertex>, Vec<Edge>) {
        let mut raster = Raster::from_image(&grid_17()).unwrap();
        let mut diag = Diagnostics::default();
        condition(&mut raster, &mut diag).unwrap();
        let classes = classify(&raster).unwrap();
        let contours = trace(&raster, &classes, &mut diag.long_walks).unwrap();
        let regions = assign_regions(&raster, 4).unwrap();
        let set = build_vertices(&raster, &classes, &regions);
        let edges = build_edges(&raster, &classes, &contours, &set.vertices).unwrap();
        (set.vertices, edges)
    }

    #[test]
    fn grid_has_exterior_edges_first() {
        let (vertices, edges) = grid_edges();
        assert_eq!(edges.len(), 12);
        for (i, e) in edges.iter().enumerate() {
            assert_eq!(e.id, i);
        }

        let exterior = edges.iter().take_while(|e| e.side == Side::Exterior).count();
        assert_eq!(exterior, 8);
        assert!(edges[8..].iter().all(|e| e.side == Side::Interior));

        let exterior_vertices = vertices.iter().filter(|v| v.side == Side::Exterior).count();
        assert_eq!(exterior, exterior_vertices);
    }

    #[test]
    fn chord_geometry_of_straight_walls() {
        let (_, edges) = grid_edges();

        // Vertical tip segment (6, 2) -- (6, 6).
        let vertical = edges
            .iter()
            .find(|e| e.ends.contains(&Pt::new(6, 2)))
            .unwrap();
        assert!((vertical.chord_length - 4.0).abs() < 1e-12);
        assert!((vertical.chord_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(vertical.polyline.len(), 5);

        // Horizontal wall (6, 6) -- (10, 6): angle folds to 0.
        let horizontal = edges
            .iter()
            .find(|e| e.ends.contains(&Pt::new(6, 6)) && e.ends.contains(&Pt::new(10, 6)))
            .unwrap();
        assert!((horizontal.chord_length - 4.0).abs() < 1e-12);
        assert!(horizontal.chord_angle.abs() < 1e-12);
        assert_eq!(horizontal.side, Side::Interior);
    }

    #[test]
    fn edge_vertex_ids_resolve_to_endpoint_positions() {
        let (vertices, edges) = grid_edges();
        for e in &edges {
            assert_eq!(vertices[e.vertices[0]].pos, e.ends[0]);
            assert_eq!(vertices[e.vertices[1]].pos, e.ends[1]);
        }
    }
}
