//! Neighbor ordering: sort each vertex's incident edges by angle.
//!
//! Face walking picks "the next edge counterclockwise after the one we
//! arrived on", which only works if every vertex lists its neighbors in
//! angular order. The direction of an incident edge is taken from the
//! polyline point next to the vertex, not from the far endpoint, so
//! curved walls sort by how they actually leave the vertex.

use crate::types::{Edge, Vertex};

/// Populate and angularly sort `neighbors`/`incident_edges` for every
/// vertex. The two lists are permuted together, so index `i` of both
/// always refers to the same incident edge.
pub(crate) fn order_neighbors(vertices: &mut [Vertex], edges: &[Edge]) {
    for v in vertices.iter_mut() {
        v.neighbors.clear();
        v.incident_edges.clear();
    }
    for e in edges {
        let [v0, v1] = e.vertices;
        vertices[v0].neighbors.push(v1);
        vertices[v0].incident_edges.push(e.id);
        vertices[v1].neighbors.push(v0);
        vertices[v1].incident_edges.push(e.id);
    }

    for v in vertices.iter_mut() {
        let mut keyed: Vec<(f64, usize, usize)> = v
            .incident_edges
            .iter()
            .zip(&v.neighbors)
            .map(|(&eid, &nid)| {
                let pts = &edges[eid].polyline;
                let next = if pts[0] == v.pos {
                    pts[1]
                } else {
                    pts[pts.len() - 2]
                };
                let angle = f64::from(next.y - v.pos.y).atan2(f64::from(next.x - v.pos.x));
                (angle, nid, eid)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        v.neighbors = keyed.iter().map(|k| k.1).collect();
        v.incident_edges = keyed.iter().map(|k| k.2).collect();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::condition;
    use crate::classify::classify;
    use crate::edge::build_edges;
    use crate::label::assign_regions;
    use crate::raster::Raster;
    use crate::test_fixtures::grid_17;
    use crate::trace::trace;
    use crate::types::{Diagnostics, Pt};
    use crate::vertex::build_vertices;

    fn ordered_grid() -> (Vec<Vertex>, Vec<Edge>) {
        let mut raster = Raster::from_image(&grid_17()).unwrap();
        let mut diag = Diagnostics::default();
        condition(&mut raster, &mut diag).unwrap();
        let classes = classify(&raster).unwrap();
        let contours = trace(&raster, &classes, &mut diag.long_walks).unwrap();
        let regions = assign_regions(&raster, 4).unwrap();
        let mut set = build_vertices(&raster, &classes, &regions);
        let edges = build_edges(&raster, &classes, &contours, &set.vertices).unwrap();
        order_neighbors(&mut set.vertices, &edges);
        (set.vertices, edges)
    }

    #[test]
    fn crossing_neighbors_come_back_in_angular_order() {
        let (vertices, _) = ordered_grid();
        let crossing = vertices.iter().find(|v| v.pos == Pt::new(6, 6)).unwrap();
        assert_eq!(crossing.neighbors.len(), 4);
        assert_eq!(crossing.incident_edges.len(), 4);

        // Angles in image coordinates: E = 0, S = pi/2, W = pi, N = -pi/2,
        // so ascending order is N, E, S, W.
        let expected = [Pt::new(6, 2), Pt::new(10, 6), Pt::new(6, 10), Pt::new(2, 6)];
        let got: Vec<Pt> = crossing
            .neighbors
            .iter()
            .map(|&n| vertices[n].pos)
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn neighbor_and_edge_lists_stay_paired() {
        let (vertices, edges) = ordered_grid();
        for v in &vertices {
            for (&nid, &eid) in v.neighbors.iter().zip(&v.incident_edges) {
                let e = &edges[eid];
                assert!(e.vertices.contains(&v.id));
                assert!(e.vertices.contains(&nid));
            }
        }
    }

    #[test]
    fn terminal_tips_have_a_single_neighbor() {
        let (vertices, _) = ordered_grid();
        for v in vertices.iter().filter(|v| v.cells.is_empty()) {
            assert_eq!(v.neighbors.len(), 1, "tip at {}", v.pos);
        }
    }
}
