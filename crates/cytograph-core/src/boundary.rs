//! Boundary conditioning: open the skeleton along the image border.
//!
//! A segmented frame usually clips cells at the image edge, leaving the
//! skeleton touching the border in ways that would fake enclosed
//! regions. Conditioning erases the border-facing walls, merges the
//! junction stumps that erasure leaves behind, and keeps only the
//! skeleton segments that still bound a real enclosed region. The
//! surviving exterior-facing run ends become the terminal tips the rest
//! of the pipeline treats as exterior vertices.

use crate::classify::{PixelClass, classify};
use crate::raster::{BOUNDARY_MARK, FILLED, FOREGROUND, Raster};
use crate::trace::trace;
use crate::types::{Diagnostics, ExtractError};

/// Condition the raster in place.
///
/// On return the raster holds only the kept skeleton segments, redrawn
/// at full foreground value. Contour counts from the conditioning trace
/// pass are recorded in `diag`.
///
/// # Errors
///
/// Propagates classification rejects and trace failures; see
/// [`classify`] and [`trace`].
pub(crate) fn condition(raster: &mut Raster, diag: &mut Diagnostics) -> Result<(), ExtractError> {
    let w = raster.width;
    let h = raster.height;

    raster.clear_border();
    let pre_classes = classify(raster)?;
    raster.flood_fill(0, 0, 0, FILLED);

    // Collect skeleton pixels facing the filled exterior. Terminals and
    // plain runs are erased outright; a four-way is erased together
    // with its four orthogonal neighbors; junctions are held back so
    // close pairs can be merged below.
    let mut erase: Vec<usize> = Vec::new();
    let mut junctions: Vec<usize> = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let id = raster.idx(x, y);
            if raster.data[id] != FOREGROUND {
                continue;
            }
            let faces_exterior = raster
                .neighbor_offsets()
                .iter()
                .any(|off| raster.data[id.wrapping_add_signed(*off)] == FILLED);
            if !faces_exterior {
                continue;
            }
            match pre_classes[id] {
                PixelClass::Terminal | PixelClass::Edge => erase.push(id),
                PixelClass::Junction => junctions.push(id),
                PixelClass::FourWay => {
                    erase.extend([id, id - w, id + w, id - 1, id + 1]);
                }
                _ => {}
            }
        }
    }
    for id in erase {
        raster.data[id] = 0;
    }

    // Junction stumps within Chebyshev distance 1 of each other are
    // remnants of a single erased wall end; drop both.
    for i in 0..junctions.len() {
        for j in i + 1..junctions.len() {
            let a = raster.pt(junctions[i]);
            let b = raster.pt(junctions[j]);
            if (a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1 {
                raster.data[junctions[i]] = 0;
                raster.data[junctions[j]] = 0;
            }
        }
    }

    raster.flood_fill(0, 0, FILLED, 0);

    let mut classes = classify(raster)?;

    // Erasure can strand single pixels; drop them before tracing.
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let id = raster.idx(x, y);
            if classes[id] == PixelClass::Isolated {
                raster.data[id] = 0;
                classes[id] = PixelClass::Interior;
            }
        }
    }

    let contours = trace(raster, &classes, &mut diag.long_walks)?;
    diag.conditioning_contours = contours.len();

    // Mark skeleton pixels that bound an enclosed (unfilled) region; a
    // segment with no marked endpoint bounds nothing and goes.
    raster.flood_fill(0, 0, 0, FILLED);
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let id = raster.idx(x, y);
            if raster.data[id] != FOREGROUND {
                continue;
            }
            let touches_region = raster
                .neighbor_offsets()
                .iter()
                .any(|off| raster.data[id.wrapping_add_signed(*off)] == 0);
            if touches_region {
                raster.data[id] = BOUNDARY_MARK;
            }
        }
    }

    let kept: Vec<_> = contours
        .into_iter()
        .filter(|c| {
            let first = c[0];
            let last = c[c.len() - 1];
            let a = raster.data[raster.idx(first.x as usize, first.y as usize)];
            let b = raster.data[raster.idx(last.x as usize, last.y as usize)];
            !(a == FOREGROUND && b == FOREGROUND)
        })
        .collect();
    diag.contours_dropped = diag.conditioning_contours - kept.len();

    raster.data.fill(0);
    for contour in &kept {
        for p in contour {
            let id = raster.idx(p.x as usize, p.y as usize);
            raster.data[id] = FOREGROUND;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures::{grid_17, plus_to_border_7};

    #[test]
    fn grid_outline_is_opened_into_tips() {
        let img = grid_17();
        let mut raster = Raster::from_image(&img).unwrap();
        let mut diag = Diagnostics::default();
        condition(&mut raster, &mut diag).unwrap();

        // The outer square is gone except where interior walls met it.
        assert_eq!(raster.data[raster.idx(2, 2)], 0);
        assert_eq!(raster.data[raster.idx(4, 2)], 0);
        assert_eq!(raster.data[raster.idx(2, 14)], 0);
        for (x, y) in [(6, 2), (10, 2), (2, 6), (14, 6), (2, 10), (14, 10), (6, 14), (10, 14)] {
            assert_eq!(raster.data[raster.idx(x, y)], FOREGROUND, "tip at ({x}, {y})");
        }
        // Interior walls survive in full.
        assert_eq!(raster.data[raster.idx(6, 8)], FOREGROUND);
        assert_eq!(raster.data[raster.idx(8, 10)], FOREGROUND);

        let foreground = raster.data.iter().filter(|&&v| v == FOREGROUND).count();
        assert_eq!(foreground, 48);

        assert_eq!(diag.conditioning_contours, 12);
        assert_eq!(diag.contours_dropped, 0);
    }

    #[test]
    fn border_touching_plus_is_erased_entirely() {
        let img = plus_to_border_7();
        let mut raster = Raster::from_image(&img).unwrap();
        let mut diag = Diagnostics::default();
        condition(&mut raster, &mut diag).unwrap();

        assert!(raster.data.iter().all(|&v| v == 0));
        assert_eq!(diag.conditioning_contours, 0);
    }
}
