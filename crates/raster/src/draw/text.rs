//! Text drawing: metrics-adjusted sizing, field-block wrapping, alignment,
//! reverse print, and quarter-turn placement.

use ab_glyph::{Font, FontVec, PxScale, PxScaleFont, ScaleFont, point};
use image::{GrayImage, Luma};
use zpl_preview_core::{BlockJustification, FieldBlock, OriginMode, TextElement};

use crate::canvas::{BLACK, Ink, Surface, WHITE, placed_offset, rotate_mask};
use crate::draw::DrawError;
use crate::fonts::{FontResolver, font_style};

/// Explicit ZPL line break inside field data.
const ZPL_NEWLINE: &str = "\\&";

pub(crate) fn draw(surface: &mut Surface, el: &TextElement) -> Result<(), DrawError> {
    let Some(font) = FontResolver::global().resolve(el.font.id) else {
        return Err(DrawError::Font(el.font.id));
    };

    let height = el.font.height.max(1) as f32;
    let aspect = font_style(el.font.id).aspect;
    let stretch = if el.font.width > 0 {
        aspect * el.font.width as f32 / height
    } else {
        aspect
    };
    let scaled = cell_scaled(font.as_ref(), height, stretch);

    let lines = layout_lines(&scaled, &el.text, el.block.as_ref());
    if lines.is_empty() {
        return Ok(());
    }

    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let line_advance = scaled.height() + scaled.line_gap()
        + el.block.as_ref().map_or(0, |b| b.line_spacing) as f32;

    let content_width = el
        .block
        .as_ref()
        .map(|b| b.width as f32)
        .unwrap_or_else(|| {
            lines
                .iter()
                .map(|l| line_width(&scaled, l))
                .fold(0.0f32, f32::max)
        });
    // Dimension cap: keeps absurd font sizes from allocating unbounded
    // masks; anything past it is off-canvas on any realistic label.
    const MASK_LIMIT: u32 = 8192;
    let mask_w = ((content_width.ceil() as u32).max(1) + 1).min(MASK_LIMIT);
    let mask_h = (((ascent - descent) + (lines.len() - 1) as f32 * line_advance)
        .ceil()
        .max(1.0) as u32
        + 1)
        .min(MASK_LIMIT);

    let mut text_mask = GrayImage::new(mask_w, mask_h);
    let mut line_boxes: Vec<(i32, i32, u32, u32)> = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let lw = line_width(&scaled, line);
        let mut x0 = match el.block.as_ref().map(|b| b.justification) {
            Some(BlockJustification::Center) => (content_width - lw) / 2.0,
            Some(BlockJustification::Right) => content_width - lw,
            // Justified falls back to left.
            _ => 0.0,
        };
        if i > 0 && let Some(b) = el.block.as_ref() {
            x0 += b.hanging_indent as f32;
        }
        let baseline = ascent + i as f32 * line_advance;
        draw_line(&mut text_mask, &scaled, line, x0, baseline);
        line_boxes.push((
            x0.floor() as i32,
            (baseline - ascent).floor() as i32,
            lw.ceil() as u32 + 1,
            (ascent - descent).ceil() as u32,
        ));
    }

    // Anchor: for baseline origin the anchor is the first baseline, so the
    // mask hangs `ascent` above it; top-left origin hangs at the anchor.
    let oy = match el.at.origin {
        OriginMode::Baseline => -(ascent.round() as i32),
        OriginMode::TopLeft => 0,
    };

    let rotated_text = rotate_mask(&text_mask, el.font.orientation);
    let (dx, dy) = placed_offset(el.font.orientation, mask_w, mask_h, 0, oy);
    let (bx, by) = (el.at.x + dx, el.at.y + dy);

    if el.at.reverse {
        // Black band beneath each line, then white glyphs on top.
        let mut bg = GrayImage::new(mask_w, mask_h);
        for &(x0, y0, w, h) in &line_boxes {
            fill_mask_rect(&mut bg, x0, y0, w, h);
        }
        let rotated_bg = rotate_mask(&bg, el.font.orientation);
        surface.blit_mask(&rotated_bg, bx, by, Ink::Paint(BLACK));
        surface.blit_mask(&rotated_text, bx, by, Ink::Paint(WHITE));
    } else {
        surface.blit_mask(&rotated_text, bx, by, Ink::Paint(BLACK));
    }
    Ok(())
}

/// Render a single unrotated line into a fresh mask; returns the mask and
/// the ascent in pixels. Shared with the barcode interpretation line.
pub(crate) fn simple_line_mask(
    font_id: char,
    height_dots: u32,
    text: &str,
) -> Option<(GrayImage, i32)> {
    let font = FontResolver::global().resolve(font_id)?;
    let scaled = cell_scaled(font.as_ref(), height_dots.max(1) as f32, font_style(font_id).aspect);
    let width = line_width(&scaled, text).ceil() as u32 + 1;
    let height = (scaled.ascent() - scaled.descent()).ceil() as u32 + 1;
    let mut mask = GrayImage::new(width.max(1), height.max(1));
    draw_line(&mut mask, &scaled, text, 0.0, scaled.ascent());
    Some((mask, scaled.ascent().round() as i32))
}

/// Scale the font so the visible cell (ascent + descent) spans
/// `height_dots` pixels, with an independent horizontal stretch.
fn cell_scaled(font: &FontVec, height_dots: f32, stretch: f32) -> PxScaleFont<&FontVec> {
    let probe = font.as_scaled(PxScale::from(100.0));
    let cell = probe.ascent() - probe.descent();
    let py = if cell > 0.0 { 100.0 * height_dots / cell } else { height_dots };
    font.as_scaled(PxScale {
        x: py * stretch,
        y: py,
    })
}

fn line_width(scaled: &PxScaleFont<&FontVec>, line: &str) -> f32 {
    line.chars()
        .map(|c| scaled.h_advance(scaled.glyph_id(c)))
        .sum()
}

fn draw_line(mask: &mut GrayImage, scaled: &PxScaleFont<&FontVec>, line: &str, x0: f32, baseline: f32) {
    let mut pen = x0;
    for ch in line.chars() {
        let id = scaled.glyph_id(ch);
        let glyph = id.with_scale_and_position(scaled.scale(), point(pen, baseline));
        pen += scaled.h_advance(id);
        let Some(outline) = scaled.font().outline_glyph(glyph) else {
            continue;
        };
        let bounds = outline.px_bounds();
        outline.draw(|gx, gy, cov| {
            let x = bounds.min.x as i32 + gx as i32;
            let y = bounds.min.y as i32 + gy as i32;
            if x < 0 || y < 0 || x >= mask.width() as i32 || y >= mask.height() as i32 {
                return;
            }
            let px = mask.get_pixel_mut(x as u32, y as u32);
            let v = (cov * 255.0) as u8;
            if v > px.0[0] {
                *px = Luma([v]);
            }
        });
    }
}

fn fill_mask_rect(mask: &mut GrayImage, x0: i32, y0: i32, w: u32, h: u32) {
    for y in y0.max(0)..(y0 + h as i32).min(mask.height() as i32) {
        for x in x0.max(0)..(x0 + w as i32).min(mask.width() as i32) {
            mask.put_pixel(x as u32, y as u32, Luma([255]));
        }
    }
}

/// Split field text into lines: explicit breaks on `\n` and the literal
/// ZPL `\&` sequence; with a field block, greedy word wrap to the block
/// width, truncated to its line limit.
fn layout_lines(
    scaled: &PxScaleFont<&FontVec>,
    text: &str,
    block: Option<&FieldBlock>,
) -> Vec<String> {
    let explicit: Vec<&str> = text
        .split(ZPL_NEWLINE)
        .flat_map(|part| part.split('\n'))
        .collect();

    let Some(block) = block else {
        return explicit.into_iter().map(str::to_string).collect();
    };

    let max_width = block.width as f32;
    let mut lines = Vec::new();
    for part in explicit {
        wrap_greedy(scaled, part, max_width, &mut lines);
    }
    lines.truncate(block.max_lines.max(1) as usize);
    lines
}

fn wrap_greedy(
    scaled: &PxScaleFont<&FontVec>,
    text: &str,
    max_width: f32,
    out: &mut Vec<String>,
) {
    if max_width <= 0.0 || text.is_empty() {
        out.push(text.to_string());
        return;
    }
    let mut current = String::new();
    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if line_width(scaled, &candidate) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        // The word alone may still be too wide; hard-break it by chars.
        let mut piece = String::new();
        for ch in word.chars() {
            piece.push(ch);
            if line_width(scaled, &piece) > max_width && piece.chars().count() > 1 {
                piece.pop();
                out.push(std::mem::take(&mut piece));
                piece.push(ch);
            }
        }
        current = piece;
    }
    out.push(current);
}
