//! Topology repair: splice out spurious stub segments.
//!
//! A segmentation artifact sometimes grows a short dead-end run (a
//! "stub") from the middle of a cell wall into the cell. The stub's tip
//! shows up as an isolated terminal, and the false junction at its base
//! splits the wall into two contours. Repair removes the stub and
//! splices the two wall halves back into one contour, so the false
//! junction disappears from the graph entirely.

use std::collections::HashMap;

use crate::classify::PixelClass;
use crate::raster::Raster;
use crate::types::{Contour, ExtractError, Pt, Vertex};

/// Remove each isolated terminal's stub and heal the wall it split.
///
/// `classes` is updated so the consumed stub pixels stop being node
/// pixels; the caller rebuilds the vertex set afterwards. When the
/// stub's base is not a plain wall split (its far endpoint does not
/// meet exactly two other contours), the stub alone is dropped and the
/// junction is left standing.
///
/// # Errors
///
/// - [`ExtractError::StubConflict`] when several contours end at one
///   isolated terminal.
/// - [`ExtractError::StubDetached`] when the stub is not registered at
///   its own far endpoint.
/// - [`ExtractError::UnrecognizedJunction`] when the spliced-out
///   junction has no vertex record.
pub(crate) fn reconnect(
    raster: &Raster,
    classes: &mut [PixelClass],
    contours: &mut Vec<Contour>,
    vertices: &mut Vec<Vertex>,
    isolated: &[usize],
) -> Result<(), ExtractError> {
    for &idx in isolated {
        let t1 = raster.pt(idx);

        // Endpoint registry over the current contour set. Rebuilt per
        // stub: earlier splices renumber the contours.
        let mut at_point: HashMap<Pt, Vec<usize>> = HashMap::new();
        for (ci, c) in contours.iter().enumerate() {
            let front = c[0];
            let back = c[c.len() - 1];
            at_point.entry(front).or_default().push(ci);
            if back != front {
                at_point.entry(back).or_default().push(ci);
            }
        }

        let Some(stub_indices) = at_point.get(&t1) else {
            continue;
        };
        let &[c1_idx] = stub_indices.as_slice() else {
            return Err(ExtractError::StubConflict { at: t1 });
        };
        let c1 = &contours[c1_idx];
        let v1 = if c1[0] == t1 { c1[c1.len() - 1] } else { c1[0] };

        let mut siblings = at_point.get(&v1).cloned().unwrap_or_default();
        let Some(own) = siblings.iter().position(|&ci| ci == c1_idx) else {
            return Err(ExtractError::StubDetached { at: v1 });
        };
        siblings.remove(own);

        let [c2_idx, c3_idx] = siblings.as_slice() else {
            // The base is a real junction of its own (more or fewer
            // than two other walls); drop the stub and keep it.
            contours.remove(c1_idx);
            continue;
        };
        let (c2_idx, c3_idx) = (*c2_idx, *c3_idx);

        // The stub's pixels stop being node pixels; its tip becomes a
        // plain run pixel inside the spliced wall's neighborhood.
        for p in &contours[c1_idx] {
            classes[raster.idx(p.x as usize, p.y as usize)] = PixelClass::Isolated;
        }
        classes[idx] = PixelClass::Edge;

        // Splice: c2 oriented to end at the base, c3 to continue from
        // it, with the shared base point kept once.
        let mut spliced = contours[c2_idx].clone();
        if spliced[0] == v1 {
            spliced.reverse();
        }
        let mut tail = contours[c3_idx].clone();
        if tail[tail.len() - 1] == v1 {
            tail.pop();
            tail.reverse();
        } else {
            tail.remove(0);
        }
        spliced.extend(tail);

        let mut doomed = [c1_idx, c2_idx, c3_idx];
        doomed.sort_unstable();
        for ci in doomed.iter().rev() {
            contours.remove(*ci);
        }
        contours.push(spliced);

        let Some(vi) = vertices.iter().position(|v| v.pos == v1) else {
            return Err(ExtractError::UnrecognizedJunction { at: v1 });
        };
        vertices.remove(vi);
    }
    Ok(())
}
