//! The element rasterizer.
//!
//! Consumes the element list in order and draws each element onto the
//! surface. A drawer that fails (barcode encode failure, missing fonts)
//! is replaced by a thin-bordered placeholder carrying a truncated
//! literal of the content, so the element loop always progresses and
//! every acquired resource is released on the way out.

mod barcode;
mod image;
mod shape;
pub(crate) mod text;

use ::image::{RgbaImage, imageops};
use zpl_preview_core::{Element, Execution, OriginMode};

use crate::canvas::{BLACK, Ink, Surface};
use crate::fonts::font_style;
use crate::symbol::{SymbolBackend, SymbolError};

/// Why one element could not be drawn (recoverable; the element renders
/// as a placeholder).
#[derive(Debug, thiserror::Error)]
pub(crate) enum DrawError {
    /// The symbol backend rejected the barcode.
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    /// No usable typeface for the font id.
    #[error("no usable font for id {0:?}")]
    Font(char),
}

/// Rasterize an execution onto a fresh surface.
pub(crate) fn rasterize(
    execution: &Execution,
    width: u32,
    height: u32,
    background: ::image::Rgba<u8>,
    symbols: &dyn SymbolBackend,
) -> RgbaImage {
    let mut surface = Surface::new(width, height, background);
    for element in &execution.elements {
        if let Err(err) = draw_element(&mut surface, symbols, element) {
            draw_placeholder(&mut surface, element, &err);
        }
    }
    let img = surface.into_image();
    // `^POI` rotates the whole drawing 180° about the bitmap center.
    if execution.state.inverted {
        imageops::rotate180(&img)
    } else {
        img
    }
}

fn draw_element(
    surface: &mut Surface,
    symbols: &dyn SymbolBackend,
    element: &Element,
) -> Result<(), DrawError> {
    match element {
        Element::Text(el) => text::draw(surface, el),
        Element::Box(el) => {
            shape::draw_box(surface, el);
            Ok(())
        }
        Element::Ellipse(el) => {
            shape::draw_ellipse(surface, el);
            Ok(())
        }
        Element::Diagonal(el) => {
            shape::draw_diagonal(surface, el);
            Ok(())
        }
        Element::Image(el) => {
            image::draw(surface, el);
            Ok(())
        }
        Element::Barcode(el) => barcode::draw(surface, symbols, el),
    }
}

/// Thin-bordered rectangle with a crossed interior and (when a font is
/// available) a truncated literal of the failed content.
fn draw_placeholder(surface: &mut Surface, element: &Element, _err: &DrawError) {
    let (x, y, w, h, literal) = placeholder_frame(element);

    surface.fill_rect(x, y, w, 2, BLACK);
    surface.fill_rect(x, y + h as i32 - 2, w, 2, BLACK);
    surface.fill_rect(x, y, 2, h, BLACK);
    surface.fill_rect(x + w as i32 - 2, y, 2, h, BLACK);
    // Crossed interior, estrella-preview style.
    for i in 0..w.min(h) {
        let x1 = x + (i * w / h.max(1)) as i32;
        let x2 = x + w as i32 - 1 - (i * w / h.max(1)) as i32;
        surface.fill_rect(x1, y + i as i32, 1, 1, BLACK);
        surface.fill_rect(x2, y + i as i32, 1, 1, BLACK);
    }

    if !literal.is_empty()
        && let Some((mask, _)) = text::simple_line_mask('0', 18, &literal)
    {
        surface.blit_mask(&mask, x + 4, y + 4, Ink::Paint(BLACK));
    }
}

/// Anchor-adjusted frame and content literal for a placeholder.
fn placeholder_frame(element: &Element) -> (i32, i32, u32, u32, String) {
    let at = element.placement();
    let (w, h, literal) = match element {
        Element::Barcode(el) => {
            let w = (el.content.len() as u32 * 6 * el.module_width.max(1)).clamp(60, 400);
            let h = el.height.clamp(30, 200);
            (w, h, truncate(&el.content, 24))
        }
        Element::Text(el) => {
            let est = (el.text.len() as f32
                * el.font.height.max(10) as f32
                * font_style(el.font.id).aspect) as u32;
            (est.clamp(40, 400), el.font.height.max(18), truncate(&el.text, 24))
        }
        _ => (60, 40, String::new()),
    };
    let y = match at.origin {
        OriginMode::Baseline => at.y - h as i32,
        OriginMode::TopLeft => at.y,
    };
    (at.x, y, w.max(8), h.max(8), literal)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{cut}…")
    }
}
