//! ZPL preview renderer.
//!
//! Renders ZPL II label code to raster images: the core crate tokenizes
//! and executes the command stream into positioned elements, and this
//! crate rasterizes those elements onto an RGBA bitmap using the system
//! font database and the built-in barcode symbol backend.
//!
//! ```no_run
//! let img = zpl_preview::render("^XA^FO50,50^A0N,30,20^FDHello^FS^XZ", 200, 100, 203)?;
//! img.save("label.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Dots map 1:1 to pixels; the DPI parameter only drives the millimeter
//! and inch conversions of [`render_mm`] and [`render_inches`].

#![warn(missing_docs)]

mod canvas;
mod draw;
/// ZPL font table and typeface resolution.
pub mod fonts;
/// Linear symbology encoders.
pub mod oned;
/// Barcode symbol backend.
pub mod symbol;

use image::{Rgba, RgbaImage};
use std::path::Path;

use symbol::{BuiltinSymbols, SymbolBackend};

// Re-export the core pipeline so one dependency serves callers.
pub use zpl_preview_core::{
    Diagnostic, Element, Execution, Label, ParseResult, Severity, execute, parse,
    validate_source,
};

/// Millimeters per inch, for the unit-conversion entry points.
const MM_PER_INCH: f64 = 25.4;

/// Canvas configuration for a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Canvas width in dots (1 dot = 1 pixel).
    pub width_dots: u32,
    /// Canvas height in dots.
    pub height_dots: u32,
    /// Print density; informational (203 is the thermal baseline).
    pub dpi: u32,
    /// Background fill color.
    pub background: Rgba<u8>,
}

impl RenderOptions {
    /// Options with a white background.
    pub fn new(width_dots: u32, height_dots: u32, dpi: u32) -> Self {
        Self {
            width_dots,
            height_dots,
            dpi,
            background: Rgba([255, 255, 255, 255]),
        }
    }

    /// Replace the background color.
    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self
    }
}

/// Why a render call failed outright (recoverable drawing problems render
/// as placeholders instead).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Canvas dimensions must be positive.
    #[error("canvas dimensions must be at least 1×1 dots (got {width}×{height})")]
    EmptyCanvas {
        /// Requested width in dots.
        width: u32,
        /// Requested height in dots.
        height: u32,
    },
    /// Encoding or writing the output image failed.
    #[error("writing the image failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render ZPL source onto a white canvas of the given size in dots.
///
/// Empty source produces a background-filled bitmap; malformed commands
/// degrade per the documented recovery rules rather than failing.
pub fn render(
    source: &str,
    width_dots: u32,
    height_dots: u32,
    dpi: u32,
) -> Result<RgbaImage, RenderError> {
    render_with_options(source, &RenderOptions::new(width_dots, height_dots, dpi))
}

/// Render with explicit options and the built-in symbol backend.
pub fn render_with_options(
    source: &str,
    options: &RenderOptions,
) -> Result<RgbaImage, RenderError> {
    render_with_backend(source, options, &BuiltinSymbols)
}

/// Render with a caller-supplied barcode symbol backend.
pub fn render_with_backend(
    source: &str,
    options: &RenderOptions,
    symbols: &dyn SymbolBackend,
) -> Result<RgbaImage, RenderError> {
    if options.width_dots == 0 || options.height_dots == 0 {
        return Err(RenderError::EmptyCanvas {
            width: options.width_dots,
            height: options.height_dots,
        });
    }
    let parsed = parse(source);
    let execution = execute(&parsed.label);
    Ok(draw::rasterize(
        &execution,
        options.width_dots,
        options.height_dots,
        options.background,
        symbols,
    ))
}

/// Render a canvas given in millimeters (`dots = mm · dpi / 25.4`).
pub fn render_mm(
    source: &str,
    width_mm: f64,
    height_mm: f64,
    dpi: u32,
) -> Result<RgbaImage, RenderError> {
    render(
        source,
        (width_mm * dpi as f64 / MM_PER_INCH).round() as u32,
        (height_mm * dpi as f64 / MM_PER_INCH).round() as u32,
        dpi,
    )
}

/// Render a canvas given in inches (`dots = inches · dpi`).
pub fn render_inches(
    source: &str,
    width_in: f64,
    height_in: f64,
    dpi: u32,
) -> Result<RgbaImage, RenderError> {
    render(
        source,
        (width_in * dpi as f64).round() as u32,
        (height_in * dpi as f64).round() as u32,
        dpi,
    )
}

/// Render and write the bitmap to `path` in the given format.
pub fn render_to_file(
    source: &str,
    path: impl AsRef<Path>,
    width_dots: u32,
    height_dots: u32,
    dpi: u32,
    format: image::ImageFormat,
) -> Result<(), RenderError> {
    let img = render(source, width_dots, height_dots, dpi)?;
    img.save_with_format(path, format)?;
    Ok(())
}

/// Validate ZPL source, returning human-readable findings; an empty list
/// means the source is clean.
pub fn validate(source: &str) -> Vec<String> {
    validate_source(source).messages()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(matches!(
            render("^XA^XZ", 0, 100, 203),
            Err(RenderError::EmptyCanvas { .. })
        ));
        assert!(matches!(
            render("^XA^XZ", 100, 0, 203),
            Err(RenderError::EmptyCanvas { .. })
        ));
    }

    #[test]
    fn empty_source_renders_background_only() {
        let img = render("", 20, 10, 203).unwrap();
        assert_eq!((img.width(), img.height()), (20, 10));
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn unit_conversions_round_to_dots() {
        // 25.4 mm = 1 inch = 203 dots at 203 dpi.
        let a = render_mm("", 25.4, 12.7, 203).unwrap();
        assert_eq!((a.width(), a.height()), (203, 102));
        let b = render_inches("", 1.0, 0.5, 203).unwrap();
        assert_eq!((b.width(), b.height()), (203, 102));
    }

    #[test]
    fn background_color_is_configurable() {
        let opts = RenderOptions::new(4, 4, 203).with_background(Rgba([250, 240, 230, 255]));
        let img = render_with_options("", &opts).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [250, 240, 230, 255]);
    }
}
