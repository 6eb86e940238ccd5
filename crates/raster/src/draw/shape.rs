//! Box, ellipse, and diagonal drawers.
//!
//! Shapes are axis-aligned (ZPL gives them no orientation parameter) and
//! paint through a clipped membership test so borders never overwrite
//! enclosed content and oversized declarations never allocate. A baseline
//! origin makes the shape grow upward from the anchor; reverse print
//! inverts the covered pixels.

use zpl_preview_core::{
    BoxElement, DiagonalElement, EllipseElement, LineColor, OriginMode, Placement, ShapeOverride,
};

use crate::canvas::{BLACK, Ink, Surface, WHITE};

pub(crate) fn draw_box(surface: &mut Surface, el: &BoxElement) {
    let (w, h) = (el.width.max(1), el.height.max(1));
    let radius = corner_radius(el.rounding, w, h);
    // A border as thick as the box is ZPL's idiom for a solid line.
    let filled = el.width <= el.border || el.height <= el.border;
    let border = el.border as f32;
    let (wf, hf) = (w as f32, h as f32);

    paint(surface, &el.at, w, h, el.color, move |x, y| {
        if !in_rounded_rect(x, y, wf, hf, radius) {
            return false;
        }
        if filled {
            return true;
        }
        let inner_r = (radius - border).max(0.0);
        !in_rounded_rect(
            x - border,
            y - border,
            wf - 2.0 * border,
            hf - 2.0 * border,
            inner_r,
        )
    });
}

pub(crate) fn draw_ellipse(surface: &mut Surface, el: &EllipseElement) {
    let (w, h) = (el.width.max(1), el.height.max(1));
    let (a, b) = (w as f32 / 2.0, h as f32 / 2.0);
    let border = el.border as f32;
    let filled = match el.shape {
        ShapeOverride::Fill => true,
        ShapeOverride::Stroke => false,
        ShapeOverride::None => border >= a.min(b),
    };

    paint(surface, &el.at, w, h, el.color, move |x, y| {
        if !in_ellipse(x, y, a, b, a, b) {
            return false;
        }
        if filled {
            return true;
        }
        !in_ellipse(x, y, a, b, a - border, b - border)
    });
}

pub(crate) fn draw_diagonal(surface: &mut Surface, el: &DiagonalElement) {
    let (w, h) = (el.width.max(1), el.height.max(1));
    let (wf, hf) = (w as f32, h as f32);
    let half = (el.border as f32 / 2.0).max(0.5);
    let norm = (wf * wf + hf * hf).sqrt();
    let leaning_right = el.leaning_right;

    paint(surface, &el.at, w, h, el.color, move |x, y| {
        // `R` runs bottom-left to top-right, `L` top-left to bottom-right.
        let dist = if leaning_right {
            (hf * x + wf * y - wf * hf).abs() / norm
        } else {
            (hf * x - wf * y).abs() / norm
        };
        dist <= half
    });
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Corner radius in pixels: `rounding/8 · min(w, h)/2`.
fn corner_radius(rounding: u8, w: u32, h: u32) -> f32 {
    rounding.min(8) as f32 / 8.0 * (w.min(h) as f32 / 2.0)
}

fn in_rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> bool {
    if w <= 0.0 || h <= 0.0 || x < 0.0 || y < 0.0 || x > w || y > h {
        return false;
    }
    let r = r.min(w / 2.0).min(h / 2.0);
    if r <= 0.0 {
        return true;
    }
    let cx = x.clamp(r, w - r);
    let cy = y.clamp(r, h - r);
    (x - cx).powi(2) + (y - cy).powi(2) <= r * r
}

fn in_ellipse(x: f32, y: f32, cx: f32, cy: f32, a: f32, b: f32) -> bool {
    if a <= 0.0 || b <= 0.0 {
        return false;
    }
    let nx = (x - cx) / a;
    let ny = (y - cy) / b;
    nx * nx + ny * ny <= 1.0
}

fn paint(
    surface: &mut Surface,
    at: &Placement,
    w: u32,
    h: u32,
    color: LineColor,
    inside: impl Fn(f32, f32) -> bool,
) {
    let y = match at.origin {
        OriginMode::Baseline => at.y - h.min(i32::MAX as u32) as i32,
        OriginMode::TopLeft => at.y,
    };
    let ink = if at.reverse {
        Ink::Xor
    } else {
        Ink::Paint(match color {
            LineColor::Black => BLACK,
            LineColor::White => WHITE,
        })
    };
    surface.paint_region(at.x, y, w, h, ink, inside);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_rect_membership() {
        // No rounding: the full rect is inside.
        assert!(in_rounded_rect(0.5, 0.5, 10.0, 10.0, 0.0));
        // Strong rounding: the extreme corner is cut away.
        assert!(!in_rounded_rect(0.2, 0.2, 10.0, 10.0, 5.0));
        assert!(in_rounded_rect(5.0, 5.0, 10.0, 10.0, 5.0));
    }

    #[test]
    fn ellipse_membership() {
        assert!(in_ellipse(5.0, 5.0, 5.0, 5.0, 5.0, 5.0));
        assert!(!in_ellipse(0.1, 0.1, 5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn corner_radius_scales_with_rounding() {
        assert_eq!(corner_radius(0, 100, 50), 0.0);
        assert_eq!(corner_radius(8, 100, 50), 25.0);
        assert_eq!(corner_radius(4, 100, 50), 12.5);
    }
}
