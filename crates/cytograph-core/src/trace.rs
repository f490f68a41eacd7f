//! Contour tracing: walk skeleton runs between node pixels.
//!
//! Every Terminal, Junction, and FourWay pixel launches as many walks
//! as its class allows. A walk steps to the first foreground neighbor
//! in priority order (orthogonals before diagonals), consuming pixels
//! behind it so runs are traced exactly once, and ends when it reaches
//! another node pixel or the raster margin. The result is one polyline
//! per skeleton segment, endpoints included.

use crate::classify::PixelClass;
use crate::raster::{FOREGROUND, Raster};
use crate::types::{Contour, ExtractError, Pt};

/// Step count past which a walk is reported as a diagnostic.
const LONG_WALK_STEPS: u32 = 150;

/// Step count past which a walk is abandoned as a loop.
const FATAL_WALK_STEPS: u32 = 200;

/// Trace all skeleton segments of the raster.
///
/// Walks run on a scratch copy of the pixel buffer; the raster itself
/// is left untouched. Coordinates of unusually long walks are appended
/// to `long_walks`.
///
/// # Errors
///
/// - [`ExtractError::IrregularLoop`] when a walk has no qualifying next
///   pixel before reaching a node.
/// - [`ExtractError::UnexpectedLoop`] when a walk exceeds the fatal
///   step bound.
/// - [`ExtractError::DegreeOverflow`] when a node accumulates more
///   segments than its classification allows.
pub(crate) fn trace(
    raster: &Raster,
    classes: &[PixelClass],
    long_walks: &mut Vec<Pt>,
) -> Result<Vec<Contour>, ExtractError> {
    let w = raster.width;
    let npb = raster.neighbor_offsets();
    let mut scratch = raster.data.clone();
    let mut degree = vec![0u32; scratch.len()];
    let mut contours: Vec<Contour> = Vec::new();

    for y in 1..raster.height - 1 {
        for x in 1..raster.width - 1 {
            let sid = raster.idx(x, y);
            let Some(quota) = classes[sid].max_degree() else {
                continue;
            };

            // Endpoints reached from this node; released after all of
            // its walks so sibling walks cannot pass through them.
            let mut reached: Vec<usize> = Vec::new();

            while degree[sid] < quota {
                let mut tid = sid;
                let mut steps: u32 = 0;
                let mut walked: u32 = 0;
                let mut pts: Contour = vec![raster.pt(tid)];

                loop {
                    let mut moved = false;
                    for (k, off) in npb.iter().enumerate() {
                        let nid = tid.wrapping_add_signed(*off);
                        if scratch[nid] != FOREGROUND {
                            continue;
                        }
                        // A length-1 stub may not immediately re-enter
                        // the pixel directly south of its start.
                        if walked == 1 && nid == sid + w {
                            continue;
                        }
                        // Diagonal steps are blocked while either of
                        // the two flanking orthogonal pixels is
                        // nonzero; the walk must take the orthogonal
                        // route through them instead.
                        let blocked = match k {
                            4 => scratch[tid - w] != 0 || scratch[tid - 1] != 0,
                            5 => scratch[tid - w] != 0 || scratch[tid + 1] != 0,
                            6 => scratch[tid - 1] != 0 || scratch[tid + w] != 0,
                            7 => scratch[tid + 1] != 0 || scratch[tid + w] != 0,
                            _ => false,
                        };
                        if blocked {
                            continue;
                        }
                        scratch[tid] = 1;
                        tid = nid;
                        walked += 1;
                        moved = true;
                        break;
                    }
                    if !moved {
                        return Err(ExtractError::IrregularLoop { at: raster.pt(tid) });
                    }

                    let pt = raster.pt(tid);
                    pts.push(pt);
                    if steps > LONG_WALK_STEPS {
                        long_walks.push(pt);
                    }
                    if steps > FATAL_WALK_STEPS {
                        return Err(ExtractError::UnexpectedLoop {
                            at: pt,
                            limit: FATAL_WALK_STEPS,
                        });
                    }
                    steps += 1;

                    let on_margin = !(1 < pt.x
                        && (pt.x as usize) < raster.width - 1
                        && 1 < pt.y
                        && (pt.y as usize) < raster.height - 1);
                    if on_margin || classes[tid].is_node() {
                        break;
                    }
                }

                degree[sid] += 1;
                degree[tid] += 1;
                for id in [sid, tid] {
                    if let Some(max) = classes[id].max_degree() {
                        if degree[id] > max {
                            return Err(ExtractError::DegreeOverflow {
                                at: raster.pt(id),
                                count: degree[id],
                                max,
                            });
                        }
                    }
                }

                contours.push(pts);
                scratch[tid] = 1;
                reached.push(tid);
            }

            for id in reached {
                scratch[id] = FOREGROUND;
            }
        }
    }
    Ok(contours)
}
