//! Pixel classification by 8-neighborhood lookup.
//!
//! Every foreground pixel's 8 neighbors form a bit mask that indexes a
//! fixed 256-entry table of local skeleton shapes. The table is what
//! makes the rest of the pipeline exact: node pixels (terminals,
//! junctions, four-ways) are recognized purely locally, and the two
//! reject shapes catch rasters that were never properly thinned.

use serde::{Deserialize, Serialize};

use crate::raster::{FOREGROUND, Raster};
use crate::types::ExtractError;

/// Local shape of a pixel, determined by its 8-neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelClass {
    /// Background pixel.
    Interior,
    /// Foreground pixel with no foreground neighbor.
    Isolated,
    /// End of a filament: exactly one outgoing run.
    Terminal,
    /// Mid-filament pixel: exactly two outgoing runs.
    Edge,
    /// Meeting point of three filaments.
    Junction,
    /// Meeting point of four filaments.
    FourWay,
    /// Corner of a solid 2x2 block; rejected.
    Block,
    /// Neighborhood too dense to be a thinned skeleton; rejected.
    Tangle,
}

impl PixelClass {
    /// Whether this class terminates a trace walk.
    #[must_use]
    pub const fn is_node(self) -> bool {
        matches!(self, Self::Terminal | Self::Junction | Self::FourWay)
    }

    /// Maximum number of traced segments a node of this class may
    /// accumulate. `None` for non-node classes.
    #[must_use]
    pub const fn max_degree(self) -> Option<u32> {
        match self {
            Self::Terminal => Some(1),
            Self::Junction => Some(3),
            Self::FourWay => Some(4),
            _ => None,
        }
    }

    /// Whether this class aborts the frame outright.
    #[must_use]
    pub const fn is_reject(self) -> bool {
        matches!(self, Self::Block | Self::Tangle)
    }
}

/// Neighborhood shape table, indexed by the 8-neighbor bit mask with
/// weights NW=1, N=2, NE=4, W=8, E=16, SW=32, S=64, SE=128.
static NEIGHBORHOOD_CLASSES: [PixelClass; 256] = {
    use PixelClass::{Block, Edge, FourWay, Isolated, Junction, Tangle, Terminal};
    [
        Isolated, Terminal, Terminal, Terminal, Terminal, Edge, Terminal, Terminal,
        Terminal, Terminal, Edge, Block, Edge, Edge, Edge, Tangle,
        Terminal, Edge, Edge, Edge, Terminal, Edge, Block, Edge,
        Edge, Edge, Junction, Edge, Edge, Edge, Tangle, Tangle,
        Terminal, Edge, Edge, Edge, Edge, Junction, Edge, Edge,
        Terminal, Terminal, Edge, Tangle, Edge, Edge, Edge, Tangle,
        Edge, Junction, Junction, Junction, Edge, Junction, Tangle, Tangle,
        Edge, Edge, Junction, Tangle, Edge, Edge, Tangle, Tangle,
        Terminal, Edge, Edge, Edge, Edge, Junction, Edge, Edge,
        Edge, Edge, Junction, Tangle, Junction, Junction, Junction, Tangle,
        Edge, Junction, Junction, Junction, Edge, Junction, Tangle, Tangle,
        Junction, Junction, FourWay, Tangle, Junction, Junction, Tangle, Tangle,
        Terminal, Edge, Edge, Edge, Edge, Junction, Edge, Edge,
        Block, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle,
        Edge, Junction, Junction, Junction, Edge, Junction, Tangle, Tangle,
        Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle,
        Terminal, Edge, Edge, Edge, Edge, Junction, Edge, Edge,
        Edge, Edge, Junction, Tangle, Junction, Junction, Junction, Tangle,
        Terminal, Edge, Edge, Edge, Terminal, Edge, Tangle, Tangle,
        Edge, Edge, Junction, Tangle, Edge, Edge, Tangle, Tangle,
        Edge, Junction, Junction, Junction, Junction, FourWay, Junction, Junction,
        Edge, Edge, Junction, Tangle, Junction, Junction, Junction, Tangle,
        Edge, Junction, Junction, Junction, Edge, Junction, Tangle, Tangle,
        Edge, Edge, Junction, Tangle, Edge, Edge, Tangle, Tangle,
        Terminal, Edge, Edge, Edge, Edge, Junction, Edge, Edge,
        Edge, Edge, Junction, Tangle, Junction, Junction, Junction, Tangle,
        Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle,
        Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle,
        Terminal, Edge, Edge, Edge, Edge, Junction, Edge, Edge,
        Block, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle,
        Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle,
        Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle, Tangle,
    ]
};

/// Bit mask of the foreground 8-neighbors of the pixel at flat index
/// `id`. The caller guarantees `id` lies inside the 1-pixel margin.
#[inline]
fn neighbor_mask(raster: &Raster, id: usize) -> usize {
    let w = raster.width;
    let d = &raster.data;
    usize::from(d[id - w - 1] == FOREGROUND)
        | usize::from(d[id - w] == FOREGROUND) << 1
        | usize::from(d[id - w + 1] == FOREGROUND) << 2
        | usize::from(d[id - 1] == FOREGROUND) << 3
        | usize::from(d[id + 1] == FOREGROUND) << 4
        | usize::from(d[id + w - 1] == FOREGROUND) << 5
        | usize::from(d[id + w] == FOREGROUND) << 6
        | usize::from(d[id + w + 1] == FOREGROUND) << 7
}

/// Classify every pixel of the raster.
///
/// Background pixels and the 1-pixel margin come back as
/// [`PixelClass::Interior`]; foreground pixels are looked up in the
/// neighborhood table.
///
/// # Errors
///
/// Returns [`ExtractError::RejectedPixel`] at the first pixel whose
/// neighborhood matches a reject class.
pub(crate) fn classify(raster: &Raster) -> Result<Vec<PixelClass>, ExtractError> {
    let mut classes = vec![PixelClass::Interior; raster.data.len()];
    for y in 1..raster.height - 1 {
        for x in 1..raster.width - 1 {
            let id = raster.idx(x, y);
            if raster.data[id] == 0 {
                continue;
            }
            let class = NEIGHBORHOOD_CLASSES[neighbor_mask(raster, id)];
            if class.is_reject() {
                return Err(ExtractError::RejectedPixel {
                    at: raster.pt(id),
                    class,
                });
            }
            classes[id] = class;
        }
    }
    Ok(classes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::raster_from_rows;

    #[test]
    fn lone_pixel_is_isolated() {
        let r = raster_from_rows(&[
            &[0, 0, 0],
            &[0, 255, 0],
            &[0, 0, 0],
        ]);
        let classes = classify(&r).unwrap();
        assert_eq!(classes[r.idx(1, 1)], PixelClass::Isolated);
    }

    #[test]
    fn horizontal_run_classifies_tips_and_middle() {
        let r = raster_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 255, 255, 255, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let classes = classify(&r).unwrap();
        assert_eq!(classes[r.idx(1, 1)], PixelClass::Terminal);
        assert_eq!(classes[r.idx(2, 1)], PixelClass::Edge);
        assert_eq!(classes[r.idx(3, 1)], PixelClass::Terminal);
        assert_eq!(classes[r.idx(2, 0)], PixelClass::Interior);
    }

    #[test]
    fn plus_center_is_four_way() {
        let r = raster_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 0, 255, 0, 0],
            &[0, 255, 255, 255, 0],
            &[0, 0, 255, 0, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let classes = classify(&r).unwrap();
        assert_eq!(classes[r.idx(2, 2)], PixelClass::FourWay);
        assert_eq!(classes[r.idx(2, 1)], PixelClass::Terminal);
        assert_eq!(classes[r.idx(1, 2)], PixelClass::Terminal);
    }

    #[test]
    fn tee_center_is_junction() {
        // North, east, and south arms.
        let r = raster_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 0, 255, 0, 0],
            &[0, 0, 255, 255, 0],
            &[0, 0, 255, 0, 0],
            &[0, 0, 0, 0, 0],
        ]);
        let classes = classify(&r).unwrap();
        assert_eq!(classes[r.idx(2, 2)], PixelClass::Junction);
    }

    #[test]
    fn solid_block_is_rejected() {
        let r = raster_from_rows(&[
            &[0, 0, 0, 0],
            &[0, 255, 255, 0],
            &[0, 255, 255, 0],
            &[0, 0, 0, 0],
        ]);
        assert!(matches!(
            classify(&r),
            Err(ExtractError::RejectedPixel { .. })
        ));
    }

    #[test]
    fn degree_maxima_match_classes() {
        assert_eq!(PixelClass::Terminal.max_degree(), Some(1));
        assert_eq!(PixelClass::Junction.max_degree(), Some(3));
        assert_eq!(PixelClass::FourWay.max_degree(), Some(4));
        assert_eq!(PixelClass::Edge.max_degree(), None);
    }
}
