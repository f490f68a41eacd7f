//! Shared types for the cytograph extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::classify::PixelClass;

/// Re-export `GrayImage` so downstream crates can hand rasters to the
/// pipeline without depending on `image` directly.
pub use image::GrayImage;

/// An integer lattice point in image coordinates.
///
/// The origin is the top-left pixel; `y` grows downward. Geometric
/// quantities derived from lattice points (areas, angles) negate `y`
/// first so they live in the usual mathematical orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pt {
    /// Column, in pixels from the left edge.
    pub x: i32,
    /// Row, in pixels from the top edge.
    pub y: i32,
}

impl Pt {
    /// Create a new lattice point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another lattice point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

impl std::fmt::Display for Pt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A traced skeleton segment: an ordered run of lattice points whose
/// first and last entries are node pixels.
pub type Contour = Vec<Pt>;

/// Whether a graph element belongs to the bounded tissue interior or to
/// the unbounded outside of a skeleton component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Bounded by membrane on all sides.
    Interior,
    /// Part of the unbounded outside region.
    Exterior,
}

/// A topological node of the extracted graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    /// Dense id; interior vertices sort before exterior ones.
    pub id: usize,
    /// Pixel position of the node.
    pub pos: Pt,
    /// Sorted, de-duplicated ids of the cells touching the node's
    /// 8-neighborhood, with the two reserved background ids removed.
    pub cells: Vec<u32>,
    /// Node classification (Terminal, Junction, or FourWay).
    pub class: PixelClass,
    /// Interior if at least one adjacent cell survives, exterior
    /// otherwise.
    pub side: Side,
    /// Neighboring vertex ids, sorted by departure angle.
    pub neighbors: Vec<usize>,
    /// Incident edge ids, kept aligned with `neighbors`.
    pub incident_edges: Vec<usize>,
}

/// An undirected skeleton segment between two vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Dense id; exterior edges sort before interior ones.
    pub id: usize,
    /// Endpoint vertex ids.
    pub vertices: [usize; 2],
    /// Endpoint pixel positions.
    pub ends: [Pt; 2],
    /// Exterior iff either endpoint is a pure Terminal node.
    pub side: Side,
    /// Straight-line distance between the endpoints.
    pub chord_length: f64,
    /// Chord angle in [0, pi), measured with `y` flipped.
    pub chord_angle: f64,
    /// The full traced polyline, endpoints included.
    pub polyline: Vec<Pt>,
}

/// A face of the extracted planar graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Dense id; exterior cells sort before interior ones.
    pub id: usize,
    /// Interior for an enclosed region, exterior for an outer boundary
    /// chain.
    pub side: Side,
    /// Bounding vertex ids. A cyclic polygon for interior cells; an
    /// open chain between two exterior vertices for exterior cells.
    pub vertices: Vec<usize>,
    /// Edge ids between consecutive bounding vertices. The wrap pair of
    /// an open exterior chain has no edge and is skipped.
    pub edges: Vec<usize>,
    /// Signed area after orientation normalization (non-negative on a
    /// successfully extracted graph).
    pub area: f64,
    /// Centroid in y-flipped (mathematical) coordinates.
    pub centroid: (f64, f64),
}

/// Configuration for one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Minimum pixel area an enclosed region must exceed. A region at or
    /// below this area aborts the frame with
    /// [`ExtractError::UndersizedRegion`].
    pub min_region_area: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { min_region_area: 4 }
    }
}

/// Global counts of a completed extraction, interior/exterior splits
/// included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    /// Total number of cells.
    pub cell_count: usize,
    /// Cells bounding an enclosed region.
    pub interior_cells: usize,
    /// Outer boundary chains.
    pub exterior_cells: usize,
    /// Total number of edges.
    pub edge_count: usize,
    /// Edges with two non-terminal endpoints.
    pub interior_edges: usize,
    /// Edges with a terminal endpoint.
    pub exterior_edges: usize,
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Vertices adjacent to at least one cell.
    pub interior_vertices: usize,
    /// Vertices adjacent to the outside only.
    pub exterior_vertices: usize,
    /// Vertices classified FourWay.
    pub four_way_count: usize,
}

/// Per-run counters useful for diagnosing a problematic input skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Contours produced by the conditioning trace pass.
    pub conditioning_contours: usize,
    /// Conditioning contours discarded as duplicate artifacts.
    pub contours_dropped: usize,
    /// Contours produced by the final trace pass.
    pub contours_traced: usize,
    /// Spurious isolated terminals found (and repaired or dropped).
    pub isolated_terminals: usize,
    /// Coordinates visited by walks that ran unusually long.
    pub long_walks: Vec<Pt>,
}

/// The extracted planar graph: vertices, edges, and cells with dense
/// cross-referencing ids, plus counts and run diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueGraph {
    /// All vertices, indexed by id.
    pub vertices: Vec<Vertex>,
    /// All edges, indexed by id.
    pub edges: Vec<Edge>,
    /// All cells, indexed by id.
    pub cells: Vec<Cell>,
    /// Verified global counts.
    pub summary: GraphSummary,
    /// Per-run diagnostics.
    pub diagnostics: Diagnostics,
}

/// Errors that abort extraction of a frame.
///
/// Every variant carries enough context (pixel coordinate, counts) to
/// locate the defect in the input skeleton. None of these are retried:
/// a malformed input is never coerced into a best-effort graph.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The raster is too small to carry a 1-pixel background margin.
    #[error("input raster {width}x{height} is too small to process")]
    InputTooSmall {
        /// Raster width in pixels.
        width: u32,
        /// Raster height in pixels.
        height: u32,
    },

    /// A 2x2 block of foreground pixels; the skeleton is not 1 pixel
    /// wide.
    #[error("unexpected four-block of skeleton pixels at {at}")]
    FourBlock {
        /// Top-left pixel of the block.
        at: Pt,
    },

    /// A pixel whose 8-neighborhood matches one of the two reject
    /// classes.
    #[error("locally malformed skeleton pixel ({class:?}) at {at}")]
    RejectedPixel {
        /// The offending pixel.
        at: Pt,
        /// Which reject class matched.
        class: PixelClass,
    },

    /// A trace walk ran out of qualifying neighbors before reaching a
    /// node pixel.
    #[error("irregular loop detected at {at}")]
    IrregularLoop {
        /// Where the walk stalled.
        at: Pt,
    },

    /// A trace walk exceeded the step bound without reaching a node
    /// pixel.
    #[error("unexpected loop: walk exceeded {limit} steps at {at}")]
    UnexpectedLoop {
        /// Where the walk was abandoned.
        at: Pt,
        /// The fatal step bound.
        limit: u32,
    },

    /// A node accumulated more traced segments than its classification
    /// allows.
    #[error("node at {at} has {count} traced segments, maximum {max}")]
    DegreeOverflow {
        /// The overfull node.
        at: Pt,
        /// Segments accounted so far.
        count: u32,
        /// Maximum for the node's classification.
        max: u32,
    },

    /// An enclosed region at or below the configured minimum area.
    #[error("region of area {area} at or below minimum {threshold}, seeded near {at}")]
    UndersizedRegion {
        /// Flood-fill seed of the region.
        at: Pt,
        /// Measured pixel area.
        area: u32,
        /// Configured minimum.
        threshold: u32,
    },

    /// More than one contour ends at an isolated terminal.
    #[error("more than one contour connected to isolated terminal at {at}")]
    StubConflict {
        /// The isolated terminal.
        at: Pt,
    },

    /// The stub contour is not registered at its own far endpoint.
    #[error("stub contour missing from junction registry at {at}")]
    StubDetached {
        /// The stub's far endpoint.
        at: Pt,
    },

    /// The junction a repair splice removed has no vertex record.
    #[error("unrecognized junction at {at}")]
    UnrecognizedJunction {
        /// The junction position.
        at: Pt,
    },

    /// A contour endpoint has no matching vertex.
    #[error("contour endpoint at {at} is not a vertex")]
    EndpointWithoutVertex {
        /// The endpoint pixel.
        at: Pt,
    },

    /// Exterior vertex and exterior edge counts disagree.
    #[error("inconsistent exterior counts: {vertices} vertices, {edges} edges")]
    ExteriorCountMismatch {
        /// Exterior vertex count.
        vertices: usize,
        /// Exterior edge count.
        edges: usize,
    },

    /// An interior cell's edge walk did not close back on its first
    /// vertex.
    #[error("cell cycle from {first} did not close (stopped at {last})")]
    OpenCellCycle {
        /// First vertex of the walk.
        first: Pt,
        /// Where the walk ended.
        last: Pt,
    },

    /// An exterior boundary walk started at a vertex of degree != 1.
    #[error("exterior vertex at {at} has degree {degree}, expected 1")]
    ExteriorStartDegree {
        /// The starting vertex.
        at: Pt,
        /// Its actual degree.
        degree: usize,
    },

    /// A boundary walk stepped onto an interior vertex of degree 1.
    #[error("dangling interior vertex at {at} during boundary walk")]
    DanglingInteriorVertex {
        /// The degree-1 vertex.
        at: Pt,
    },

    /// A boundary walk lost track of the vertex it arrived from.
    #[error("arrival vertex missing from neighbor list at {at}")]
    MissingWalkOrigin {
        /// Where the walk lost its origin.
        at: Pt,
    },

    /// A boundary walk visited more vertices than the graph holds.
    #[error("boundary walk from {at} never reached an exterior vertex")]
    RunawayBoundaryWalk {
        /// The starting vertex.
        at: Pt,
    },

    /// A cell kept a negative signed area after orientation
    /// normalization.
    #[error("negative area {area} at cell {cell}, first vertex {at}")]
    NegativeArea {
        /// The offending cell id.
        cell: usize,
        /// The signed area found.
        area: f64,
        /// The cell's first bounding vertex.
        at: Pt,
    },

    /// The global count relation failed on the completed graph.
    #[error(
        "inconsistent counts: v={vertices} e={edges} c={cells} \
         exterior={exterior} four-way={four_way}"
    )]
    InconsistentCounts {
        /// Total vertices.
        vertices: usize,
        /// Total edges.
        edges: usize,
        /// Total cells.
        cells: usize,
        /// Exterior cell count.
        exterior: usize,
        /// FourWay vertex count.
        four_way: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pt_distance() {
        let a = Pt::new(0, 0);
        let b = Pt::new(3, 4);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pt_display() {
        assert_eq!(Pt::new(7, -2).to_string(), "(7, -2)");
    }

    #[test]
    fn config_default_minimum_area() {
        assert_eq!(ExtractConfig::default().min_region_area, 4);
    }

    #[test]
    fn pt_serde_round_trip() {
        let p = Pt::new(12, 34);
        let json = serde_json::to_string(&p).unwrap();
        let back: Pt = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn error_messages_carry_coordinates() {
        let err = ExtractError::IrregularLoop { at: Pt::new(4, 9) };
        assert_eq!(err.to_string(), "irregular loop detected at (4, 9)");

        let err = ExtractError::UndersizedRegion {
            at: Pt::new(1, 2),
            area: 3,
            threshold: 4,
        };
        assert!(err.to_string().contains("(1, 2)"));
        assert!(err.to_string().contains('3'));
    }
}
