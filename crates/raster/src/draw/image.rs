//! 1-bit image drawer: integer magnification, quarter-turn placement.

use zpl_preview_core::{ImageElement, OriginMode};

use crate::canvas::{BLACK, Ink, Surface, mask_from_mono, placed_offset, rotate_mask, scale_mask};

pub(crate) fn draw(surface: &mut Surface, el: &ImageElement) {
    if el.bitmap.width == 0 || el.bitmap.height == 0 {
        return;
    }
    let mask = mask_from_mono(&el.bitmap);
    // Keep magnified dimensions within a sane ceiling; anything larger is
    // off-canvas on any realistic label.
    const DIM_LIMIT: u32 = 16384;
    let sx = el.scale_x.clamp(1, (DIM_LIMIT / mask.width()).max(1));
    let sy = el.scale_y.clamp(1, (DIM_LIMIT / mask.height()).max(1));
    let scaled = scale_mask(&mask, sx, sy);
    let (w, h) = (scaled.width(), scaled.height());

    let oy = match el.at.origin {
        OriginMode::Baseline => -(h as i32),
        OriginMode::TopLeft => 0,
    };
    let rotated = rotate_mask(&scaled, el.orientation);
    let (dx, dy) = placed_offset(el.orientation, w, h, 0, oy);
    let ink = if el.at.reverse { Ink::Xor } else { Ink::Paint(BLACK) };
    surface.blit_mask(&rotated, el.at.x + dx, el.at.y + dy, ink);
}
