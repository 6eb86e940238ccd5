//! The drawing surface and mask plumbing.
//!
//! Elements render as grayscale coverage masks which are quarter-rotated
//! and blitted onto an RGBA surface. Quarter turns are exact (no
//! resampling), matching how a thermal printer rotates fields; scaling is
//! nearest-neighbor to keep 1-bit artwork crisp.

use image::{GrayImage, Luma, Rgba, RgbaImage, imageops};
use zpl_preview_core::{MonoBitmap, Orientation};

/// Opaque black.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Opaque white.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// How a mask's coverage is applied to the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ink {
    /// Alpha-blend the given color by coverage.
    Paint(Rgba<u8>),
    /// Invert the destination wherever coverage is at least half.
    Xor,
}

/// An RGBA bitmap with mask blitting.
pub struct Surface {
    img: RgbaImage,
}

impl Surface {
    /// Create a surface filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self {
            img: RgbaImage::from_pixel(width, height, background),
        }
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.img.width()
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.img.height()
    }

    /// Consume the surface, returning the bitmap.
    pub fn into_image(self) -> RgbaImage {
        self.img
    }

    /// Fill an axis-aligned rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba<u8>) {
        if w == 0 || h == 0 {
            return;
        }
        let rect = imageproc::rect::Rect::at(x, y).of_size(w, h);
        imageproc::drawing::draw_filled_rect_mut(&mut self.img, rect, color);
    }

    /// Paint every pixel of the rectangle at `(x, y)` whose center passes
    /// `inside` (local coordinates). Iteration is clipped to the surface,
    /// so arbitrarily large shape declarations cost no memory.
    pub fn paint_region(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        ink: Ink,
        inside: impl Fn(f32, f32) -> bool,
    ) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x.saturating_add(w.min(i32::MAX as u32) as i32)).min(self.img.width() as i32);
        let y1 = (y.saturating_add(h.min(i32::MAX as u32) as i32)).min(self.img.height() as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                let lx = (px - x) as f32 + 0.5;
                let ly = (py - y) as f32 + 0.5;
                if !inside(lx, ly) {
                    continue;
                }
                let dst = self.img.get_pixel_mut(px as u32, py as u32);
                match ink {
                    Ink::Paint(color) => *dst = color,
                    Ink::Xor => {
                        dst.0[0] = 255 - dst.0[0];
                        dst.0[1] = 255 - dst.0[1];
                        dst.0[2] = 255 - dst.0[2];
                    }
                }
            }
        }
    }

    /// Blit a coverage mask with its top-left corner at `(x, y)`.
    pub fn blit_mask(&mut self, mask: &GrayImage, x: i32, y: i32, ink: Ink) {
        let (sw, sh) = (self.img.width() as i64, self.img.height() as i64);
        for (mx, my, px) in mask.enumerate_pixels() {
            let cov = px.0[0];
            if cov == 0 {
                continue;
            }
            let dx = x as i64 + mx as i64;
            let dy = y as i64 + my as i64;
            if dx < 0 || dy < 0 || dx >= sw || dy >= sh {
                continue;
            }
            let dst = self.img.get_pixel_mut(dx as u32, dy as u32);
            match ink {
                Ink::Paint(color) => *dst = blend(*dst, color, cov),
                Ink::Xor => {
                    if cov >= 128 {
                        dst.0[0] = 255 - dst.0[0];
                        dst.0[1] = 255 - dst.0[1];
                        dst.0[2] = 255 - dst.0[2];
                    }
                }
            }
        }
    }
}

fn blend(dst: Rgba<u8>, src: Rgba<u8>, cov: u8) -> Rgba<u8> {
    if cov == 255 {
        return src;
    }
    let a = cov as u32;
    let ia = 255 - a;
    Rgba([
        ((src.0[0] as u32 * a + dst.0[0] as u32 * ia) / 255) as u8,
        ((src.0[1] as u32 * a + dst.0[1] as u32 * ia) / 255) as u8,
        ((src.0[2] as u32 * a + dst.0[2] as u32 * ia) / 255) as u8,
        255,
    ])
}

// ── Mask helpers ─────────────────────────────────────────────────────────

/// Full-coverage mask from a 1-bit bitmap.
pub fn mask_from_mono(bmp: &MonoBitmap) -> GrayImage {
    let mut mask = GrayImage::new(bmp.width.max(1), bmp.height.max(1));
    for y in 0..bmp.height {
        for x in 0..bmp.width {
            if bmp.get(x, y) {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }
    mask
}

/// Integer nearest-neighbor magnification.
pub fn scale_mask(mask: &GrayImage, sx: u32, sy: u32) -> GrayImage {
    if sx <= 1 && sy <= 1 {
        return mask.clone();
    }
    imageops::resize(
        mask,
        mask.width() * sx.max(1),
        mask.height() * sy.max(1),
        imageops::FilterType::Nearest,
    )
}

/// Rotate a mask by a quarter turn.
pub fn rotate_mask(mask: &GrayImage, orientation: Orientation) -> GrayImage {
    match orientation {
        Orientation::Normal => mask.clone(),
        Orientation::Rot90 => imageops::rotate90(mask),
        Orientation::Rot180 => imageops::rotate180(mask),
        Orientation::Rot270 => imageops::rotate270(mask),
    }
}

/// Device offset (relative to the anchor) of a rotated mask's top-left
/// corner.
///
/// The mask occupies the local rectangle at `(ox, oy)` with size
/// `(w, h)`; the local frame is translated to the anchor, rotated by the
/// orientation, then shifted by the canonical per-orientation translation
/// so the drawing grows right-and-down from the anchor:
///
/// | orientation | post-rotate translate |
/// |-------------|-----------------------|
/// | normal      | (0, 0)                |
/// | 90°         | (0, −h)               |
/// | 180°        | (−w, −h)              |
/// | 270°        | (−w, 0)               |
pub fn placed_offset(orientation: Orientation, w: u32, h: u32, ox: i32, oy: i32) -> (i32, i32) {
    let (w, h) = (w as i32, h as i32);
    let (tx, ty) = match orientation {
        Orientation::Normal => (0, 0),
        Orientation::Rot90 => (0, -h),
        Orientation::Rot180 => (-w, -h),
        Orientation::Rot270 => (-w, 0),
    };
    // Shifted local rect corners.
    let (x0, y0) = (ox + tx, oy + ty);
    let (x1, y1) = (x0 + w, y0 + h);
    // Rotate the rect (clockwise, y-down) and take the new top-left.
    match orientation {
        Orientation::Normal => (x0, y0),
        Orientation::Rot90 => (-y1, x0),
        Orientation::Rot180 => (-x1, -y1),
        Orientation::Rot270 => (y0, -x1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placed_offset_hangs_right_and_down_without_local_offset() {
        for o in [
            Orientation::Normal,
            Orientation::Rot90,
            Orientation::Rot180,
            Orientation::Rot270,
        ] {
            assert_eq!(placed_offset(o, 30, 10, 0, 0), (0, 0), "{o:?}");
        }
    }

    #[test]
    fn placed_offset_baseline_shift_moves_up_when_normal() {
        // A mask hung above the anchor (text above its baseline).
        assert_eq!(placed_offset(Orientation::Normal, 30, 10, 0, -10), (0, -10));
    }

    #[test]
    fn rotate_mask_quarter_turns() {
        let mut m = GrayImage::new(3, 2);
        m.put_pixel(0, 0, Luma([255]));
        let r = rotate_mask(&m, Orientation::Rot90);
        assert_eq!((r.width(), r.height()), (2, 3));
        // (x, y) → (h-1-y, x)
        assert_eq!(r.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn xor_inverts_and_reverts() {
        let mut s = Surface::new(4, 4, WHITE);
        let mut m = GrayImage::new(2, 2);
        m.put_pixel(0, 0, Luma([255]));
        s.blit_mask(&m, 1, 1, Ink::Xor);
        assert_eq!(s.img.get_pixel(1, 1).0[0], 0);
        s.blit_mask(&m, 1, 1, Ink::Xor);
        assert_eq!(s.img.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn blit_clips_at_surface_edges() {
        let mut s = Surface::new(2, 2, WHITE);
        let mut m = GrayImage::new(4, 4);
        for p in m.pixels_mut() {
            *p = Luma([255]);
        }
        s.blit_mask(&m, -2, -2, Ink::Paint(BLACK));
        s.blit_mask(&m, 1, 1, Ink::Paint(BLACK));
        assert_eq!(s.img.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn scale_mask_is_nearest_neighbor() {
        let mut m = GrayImage::new(2, 1);
        m.put_pixel(0, 0, Luma([255]));
        let s = scale_mask(&m, 3, 2);
        assert_eq!((s.width(), s.height()), (6, 2));
        assert_eq!(s.get_pixel(2, 1).0[0], 255);
        assert_eq!(s.get_pixel(3, 0).0[0], 0);
    }
}
