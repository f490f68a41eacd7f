//! In-memory raster buffer and pixel-level primitives.
//!
//! The pipeline works on a flat `Vec<u8>` copy of the input image so it
//! can mark, fill, and redraw pixels destructively without touching the
//! caller's buffer. Every stage addresses pixels by flat index; the
//! 1-pixel border of the raster is kept at background so neighborhood
//! reads never leave the buffer.

use image::GrayImage;

use crate::types::{ExtractError, Pt};

/// Membrane (skeleton) pixel value.
pub(crate) const FOREGROUND: u8 = 255;

/// Distinguished value for membrane pixels adjacent to the filled
/// exterior background.
pub(crate) const BOUNDARY_MARK: u8 = 128;

/// Flood-fill marker for the exterior background.
pub(crate) const FILLED: u8 = 1;

/// A mutable 8-bit raster with flat indexing.
#[derive(Debug, Clone)]
pub(crate) struct Raster {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) data: Vec<u8>,
}

impl Raster {
    /// Copy a grayscale image into a working raster.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InputTooSmall`] when either dimension is
    /// below 3; the pipeline needs a clearable 1-pixel margin.
    pub(crate) fn from_image(img: &GrayImage) -> Result<Self, ExtractError> {
        let (w, h) = img.dimensions();
        if w < 3 || h < 3 {
            return Err(ExtractError::InputTooSmall {
                width: w,
                height: h,
            });
        }
        Ok(Self {
            width: w as usize,
            height: h as usize,
            data: img.as_raw().clone(),
        })
    }

    /// Flat index of `(x, y)`.
    #[inline]
    pub(crate) const fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Coordinate of a flat index.
    #[inline]
    pub(crate) fn pt(&self, idx: usize) -> Pt {
        Pt::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    /// Signed flat offsets of the 8 neighbors, in trace priority order:
    /// N, W, E, S, NW, NE, SW, SE. Orthogonal steps are preferred over
    /// diagonal ones.
    pub(crate) fn neighbor_offsets(&self) -> [isize; 8] {
        let w = self.width as isize;
        [-w, -1, 1, w, -w - 1, -w + 1, w - 1, w + 1]
    }

    /// Zero the 1-pixel border.
    pub(crate) fn clear_border(&mut self) {
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            self.data[x] = 0;
            self.data[(h - 1) * w + x] = 0;
        }
        for y in 0..h {
            self.data[y * w] = 0;
            self.data[y * w + w - 1] = 0;
        }
    }

    /// Reject any 2x2 block of foreground pixels.
    ///
    /// A valid skeleton is 1 pixel wide everywhere; a solid 2x2 block
    /// means the upstream thinning failed and every later stage would
    /// misread the neighborhood table.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::FourBlock`] with the block's top-left
    /// coordinate.
    pub(crate) fn check_four_blocks(&self) -> Result<(), ExtractError> {
        let w = self.width;
        for y in 0..self.height - 1 {
            for x in 0..w - 1 {
                let id = y * w + x;
                if self.data[id] == FOREGROUND
                    && self.data[id + 1] == FOREGROUND
                    && self.data[id + w] == FOREGROUND
                    && self.data[id + w + 1] == FOREGROUND
                {
                    return Err(ExtractError::FourBlock { at: self.pt(id) });
                }
            }
        }
        Ok(())
    }

    /// 4-connected flood fill from `(x, y)`: repaint every reachable
    /// pixel of value `from` with `to`. Iterative, so deep regions never
    /// exhaust the call stack.
    pub(crate) fn flood_fill(&mut self, x: usize, y: usize, from: u8, to: u8) {
        if from == to || self.data[self.idx(x, y)] != from {
            return;
        }
        let w = self.width;
        let mut stack = vec![self.idx(x, y)];
        self.data[y * w + x] = to;
        while let Some(id) = stack.pop() {
            let px = id % w;
            let py = id / w;
            let mut push = |nid: usize, data: &mut Vec<u8>| {
                if data[nid] == from {
                    data[nid] = to;
                    stack.push(nid);
                }
            };
            if px > 0 {
                push(id - 1, &mut self.data);
            }
            if px + 1 < w {
                push(id + 1, &mut self.data);
            }
            if py > 0 {
                push(id - w, &mut self.data);
            }
            if py + 1 < self.height {
                push(id + w, &mut self.data);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::test_fixtures::raster_from_rows;

    #[test]
    fn rejects_tiny_images() {
        let img = GrayImage::new(2, 8);
        assert!(matches!(
            Raster::from_image(&img),
            Err(ExtractError::InputTooSmall { width: 2, height: 8 })
        ));
    }

    #[test]
    fn idx_and_pt_round_trip() {
        let r = raster_from_rows(&[&[0u8; 5][..]; 4]);
        let id = r.idx(3, 2);
        assert_eq!(id, 13);
        assert_eq!(r.pt(id), Pt::new(3, 2));
    }

    #[test]
    fn four_block_detected_at_top_left() {
        let mut r = raster_from_rows(&[&[0u8; 5][..]; 5]);
        for (x, y) in [(2, 1), (3, 1), (2, 2), (3, 2)] {
            let id = r.idx(x, y);
            r.data[id] = FOREGROUND;
        }
        match r.check_four_blocks() {
            Err(ExtractError::FourBlock { at }) => assert_eq!(at, Pt::new(2, 1)),
            other => panic!("expected FourBlock, got {other:?}"),
        }
    }

    #[test]
    fn flood_fill_respects_membrane() {
        // A closed box: the outside fills, the inside does not.
        let mut r = raster_from_rows(&[
            &[0, 0, 0, 0, 0],
            &[0, 255, 255, 255, 0],
            &[0, 255, 0, 255, 0],
            &[0, 255, 255, 255, 0],
            &[0, 0, 0, 0, 0],
        ]);
        r.flood_fill(0, 0, 0, FILLED);
        assert_eq!(r.data[r.idx(2, 2)], 0);
        assert_eq!(r.data[r.idx(0, 4)], FILLED);
        assert_eq!(r.data[r.idx(4, 0)], FILLED);
    }

    #[test]
    fn clear_border_zeroes_margin_only() {
        let mut r = raster_from_rows(&[&[255u8; 4][..]; 4]);
        r.clear_border();
        for y in 0..4 {
            for x in 0..4 {
                let expect = u8::from(x > 0 && x < 3 && y > 0 && y < 3) * 255;
                assert_eq!(r.data[r.idx(x, y)], expect, "at ({x}, {y})");
            }
        }
    }
}
