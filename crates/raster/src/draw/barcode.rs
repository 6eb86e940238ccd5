//! Barcode drawer: symbol lookup, scaling, interpretation lines, and
//! quarter-turn placement.

use image::GrayImage;
use zpl_preview_core::{BarcodeElement, BarcodeKind, InterpretationLine, OriginMode};

use crate::canvas::{BLACK, Ink, Surface, mask_from_mono, placed_offset, rotate_mask, scale_mask};
use crate::draw::{DrawError, text};
use crate::symbol::{SymbolBackend, SymbolOptions, SymbolPattern};

pub(crate) fn draw(
    surface: &mut Surface,
    symbols: &dyn SymbolBackend,
    el: &BarcodeElement,
) -> Result<(), DrawError> {
    let content = if el.kind == BarcodeKind::Code128 {
        strip_code128_escapes(&el.content)
    } else {
        el.content.clone()
    };
    let options = SymbolOptions {
        module_width: el.module_width.max(1),
        ratio: el.ratio,
        error_correction: el.error_correction,
        check_digit: el.check_digit,
        columns: el.columns,
        rows: el.rows,
    };
    let pattern = symbols.encode(el.kind, &content, &options)?;

    let mask = match pattern {
        SymbolPattern::Matrix(grid) => {
            let sx = el.module_width.clamp(1, 10);
            // PDF417 rows are taller than wide; other matrices are square.
            let sy = if el.kind == BarcodeKind::Pdf417 {
                el.height.max(el.module_width * 3).min(512)
            } else {
                sx
            };
            scale_mask(&mask_from_mono(&grid), sx, sy)
        }
        SymbolPattern::Linear(row) => linear_mask(el, &row, &content),
    };

    let (w, h) = (mask.width(), mask.height());
    // A baseline anchor sits under the symbol: shift up by the full height.
    let oy = match el.at.origin {
        OriginMode::Baseline => -(h as i32),
        OriginMode::TopLeft => 0,
    };
    let rotated = rotate_mask(&mask, el.orientation);
    let (dx, dy) = placed_offset(el.orientation, w, h, 0, oy);
    let ink = if el.at.reverse { Ink::Xor } else { Ink::Paint(BLACK) };
    surface.blit_mask(&rotated, el.at.x + dx, el.at.y + dy, ink);
    Ok(())
}

/// Bars extruded to the bar height, plus the interpretation line when
/// requested (drawn by us; the backend only produces bare modules).
fn linear_mask(el: &BarcodeElement, row: &[bool], content: &str) -> GrayImage {
    let bar_w = row.len() as u32;
    let bar_h = el.height.clamp(1, 8192);

    let interp = match el.interpretation {
        InterpretationLine::Off => None,
        _ => interp_line_mask(el, content),
    };
    let gap = el.module_width.max(1);

    let (total_w, total_h) = match &interp {
        Some(m) => (bar_w.max(m.width()), bar_h + gap + m.height()),
        None => (bar_w, bar_h),
    };
    let mut mask = GrayImage::new(total_w.max(1), total_h);

    let (bars_y, text_y) = match el.interpretation {
        InterpretationLine::Above => {
            let th = interp.as_ref().map_or(0, |m| m.height());
            (total_h - bar_h, Some(0u32).filter(|_| th > 0))
        }
        _ => (0, Some(bar_h + gap)),
    };

    let bar_x = (total_w - bar_w) / 2;
    for (i, &bar) in row.iter().enumerate() {
        if !bar {
            continue;
        }
        for y in bars_y..bars_y + bar_h {
            mask.put_pixel(bar_x + i as u32, y, image::Luma([255]));
        }
    }

    if let (Some(text_mask), Some(ty)) = (interp, text_y) {
        let tx = (total_w - text_mask.width().min(total_w)) / 2;
        for (mx, my, px) in text_mask.enumerate_pixels() {
            let (x, y) = (tx + mx, ty + my);
            if px.0[0] > 0 && x < mask.width() && y < mask.height() {
                mask.put_pixel(x, y, *px);
            }
        }
    }
    mask
}

/// Interpretation line text, sized from the module width.
fn interp_line_mask(el: &BarcodeElement, content: &str) -> Option<GrayImage> {
    if content.is_empty() {
        return None;
    }
    let height = (el.module_width * 8).clamp(14, 60);
    text::simple_line_mask('0', height, content).map(|(mask, _)| mask)
}

/// Remove ZPL `>` escape pairs (subset switches and function codes) from
/// Code 128 field data.
fn strip_code128_escapes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '>' {
            // The escape consumes the next character too.
            let _ = chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code128_escapes_are_stripped() {
        assert_eq!(strip_code128_escapes(">:HELLO>5012"), "HELLO012");
        assert_eq!(strip_code128_escapes("plain"), "plain");
        assert_eq!(strip_code128_escapes("end>"), "end");
    }
}
