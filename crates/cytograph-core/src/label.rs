//! Region labeling: number the connected background regions.
//!
//! After conditioning, every 4-connected background region is either
//! the unbounded exterior (always the first region found, seeded at the
//! cleared border) or an enclosed cell. Cells get dense ids starting at
//! 2; id 1 is the exterior, id 0 the membrane itself. A suspiciously
//! small enclosed region means the segmentation broke a wall, so it
//! aborts the frame instead of polluting the graph.

use crate::raster::Raster;
use crate::types::ExtractError;

/// Result of region labeling.
#[derive(Debug, Clone)]
pub(crate) struct Regions {
    /// Per-pixel region id: 0 = membrane, 1 = exterior background,
    /// enclosed cells from 2 up.
    pub(crate) cell_ids: Vec<u32>,
    /// Number of enclosed cells.
    pub(crate) cell_count: usize,
}

/// Label all background regions of the conditioned raster.
///
/// # Errors
///
/// Returns [`ExtractError::UndersizedRegion`] when an enclosed region's
/// pixel count is at or below `min_area`.
pub(crate) fn assign_regions(raster: &Raster, min_area: u32) -> Result<Regions, ExtractError> {
    let w = raster.width;
    let h = raster.height;
    let mut labels: Vec<u32> = raster.data.iter().map(|&v| u32::from(v != 0)).collect();

    let mut next_label: u32 = 2;
    for y in 0..h {
        for x in 0..w {
            let id = y * w + x;
            if labels[id] != 0 {
                continue;
            }
            let area = fill_region(&mut labels, w, h, id, next_label);
            // The first region is the unbounded exterior; its area is
            // never suspect.
            if next_label > 2 && area <= min_area {
                return Err(ExtractError::UndersizedRegion {
                    at: raster.pt(id),
                    area,
                    threshold: min_area,
                });
            }
            next_label += 1;
        }
    }

    let cell_ids: Vec<u32> = labels.iter().map(|&v| v.saturating_sub(1)).collect();
    let cell_count = (next_label.saturating_sub(3)) as usize;
    Ok(Regions {
        cell_ids,
        cell_count,
    })
}

/// 4-connected flood fill of the zero region containing `seed`; returns
/// the region's pixel count.
fn fill_region(labels: &mut [u32], w: usize, h: usize, seed: usize, label: u32) -> u32 {
    let mut area: u32 = 0;
    let mut stack = vec![seed];
    labels[seed] = label;
    while let Some(id) = stack.pop() {
        area += 1;
        let x = id % w;
        let y = id / w;
        let mut visit = |nid: usize, labels: &mut [u32]| {
            if labels[nid] == 0 {
                labels[nid] = label;
                stack.push(nid);
            }
        };
        if x > 0 {
            visit(id - 1, labels);
        }
        if x + 1 < w {
            visit(id + 1, labels);
        }
        if y > 0 {
            visit(id - w, labels);
        }
        if y + 1 < h {
            visit(id + w, labels);
        }
    }
    area
}
