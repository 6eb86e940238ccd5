//! Positioned drawing records produced by the command executor.
//!
//! Elements are flat, fully-resolved snapshots: their anchor and style are
//! fixed from the execution state in effect when they were emitted, and
//! later state changes never mutate them. The rasterizer consumes the
//! element list in order.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ── Shared vocabulary ────────────────────────────────────────────────────

/// Field rotation, from the ZPL `N`/`R`/`I`/`B` orientation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// No rotation (`N`).
    #[default]
    Normal,
    /// 90° clockwise (`R`, "rotated").
    Rot90,
    /// 180° (`I`, "inverted").
    Rot180,
    /// 270° clockwise (`B`, "bottom-up").
    Rot270,
}

impl Orientation {
    /// Parse a ZPL orientation character; anything unrecognized is `Normal`.
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'R' => Orientation::Rot90,
            'I' => Orientation::Rot180,
            'B' => Orientation::Rot270,
            _ => Orientation::Normal,
        }
    }

    /// The ZPL orientation character for this rotation.
    pub fn as_char(self) -> char {
        match self {
            Orientation::Normal => 'N',
            Orientation::Rot90 => 'R',
            Orientation::Rot180 => 'I',
            Orientation::Rot270 => 'B',
        }
    }
}

/// Whether the anchor is the top-left corner (`^FO`) or the text baseline
/// (`^FT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OriginMode {
    /// Anchor is the top-left of the field.
    #[default]
    TopLeft,
    /// Anchor is the baseline of the first text line (fields without a
    /// baseline grow upward from the anchor).
    Baseline,
}

/// Drawing color for shapes (`B`/`W`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineColor {
    /// Black ink (`B`).
    #[default]
    Black,
    /// White ink (`W`).
    White,
}

impl LineColor {
    /// Parse a ZPL color character; anything unrecognized is `Black`.
    pub fn from_char(c: char) -> Self {
        if c.eq_ignore_ascii_case(&'W') {
            LineColor::White
        } else {
            LineColor::Black
        }
    }

    /// The ZPL color character.
    pub fn as_char(self) -> char {
        match self {
            LineColor::Black => 'B',
            LineColor::White => 'W',
        }
    }
}

/// Optional fill/stroke override for ellipses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeOverride {
    /// Use the border-driven default (fill when the border swallows the
    /// interior, stroke otherwise).
    #[default]
    None,
    /// Always fill.
    Fill,
    /// Always stroke.
    Stroke,
}

/// Text justification within a field block (`^FB` parameter `j`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockJustification {
    /// Left aligned (`L`, default).
    #[default]
    Left,
    /// Centered (`C`).
    Center,
    /// Right aligned (`R`).
    Right,
    /// Justified (`J`); rendered as left.
    Justified,
}

impl BlockJustification {
    /// Parse a ZPL justification character; anything unrecognized is `Left`.
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'C' => BlockJustification::Center,
            'R' => BlockJustification::Right,
            'J' => BlockJustification::Justified,
            _ => BlockJustification::Left,
        }
    }

    /// The ZPL justification character.
    pub fn as_char(self) -> char {
        match self {
            BlockJustification::Left => 'L',
            BlockJustification::Center => 'C',
            BlockJustification::Right => 'R',
            BlockJustification::Justified => 'J',
        }
    }
}

/// Placement of the human-readable interpretation line on 1-D barcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpretationLine {
    /// No interpretation line.
    Off,
    /// Text below the bars (default).
    #[default]
    Below,
    /// Text above the bars.
    Above,
}

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrEcLevel {
    /// ~7% recovery (`L`).
    Low,
    /// ~15% recovery (`M`, default).
    Medium,
    /// ~25% recovery (`Q`).
    Quartile,
    /// ~30% recovery (`H`).
    High,
}

impl QrEcLevel {
    /// Parse a ZPL error-correction character.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(QrEcLevel::Low),
            'M' => Some(QrEcLevel::Medium),
            'Q' => Some(QrEcLevel::Quartile),
            'H' => Some(QrEcLevel::High),
            _ => None,
        }
    }
}

/// Barcode symbology selected by a `^B…` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarcodeKind {
    /// `^BC` Code 128.
    Code128,
    /// `^B3` Code 39.
    Code39,
    /// `^BE` EAN-13.
    Ean13,
    /// `^BA` Code 93.
    Code93,
    /// `^BU` UPC-A.
    UpcA,
    /// `^BQ` QR Code.
    Qr,
    /// `^BX` Data Matrix.
    DataMatrix,
    /// `^B7` PDF417.
    Pdf417,
    /// `^B0` Aztec.
    Aztec,
    /// `^BD` MaxiCode.
    MaxiCode,
    /// `^B2` Interleaved 2 of 5.
    Interleaved2of5,
    /// `^BK` Codabar.
    Codabar,
}

impl BarcodeKind {
    /// `true` for the linear (bar) symbologies.
    pub fn is_linear(self) -> bool {
        matches!(
            self,
            BarcodeKind::Code128
                | BarcodeKind::Code39
                | BarcodeKind::Ean13
                | BarcodeKind::Code93
                | BarcodeKind::UpcA
                | BarcodeKind::Interleaved2of5
                | BarcodeKind::Codabar
        )
    }
}

/// A multi-line text box set by `^FB`, snapshotted onto the next field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldBlock {
    /// Block width in dots.
    pub width: u32,
    /// Maximum number of lines.
    pub max_lines: u32,
    /// Extra space between lines in dots (may be negative).
    pub line_spacing: i32,
    /// Line justification.
    pub justification: BlockJustification,
    /// Hanging indent of lines after the first, in dots.
    pub hanging_indent: u32,
}

// ── 1-bit bitmap ─────────────────────────────────────────────────────────

/// A 1-bit bitmap: rows packed MSB-first, 1 = black.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonoBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Packed pixel rows, `row_bytes()` bytes per row.
    pub data: Vec<u8>,
}

impl MonoBitmap {
    /// Create an all-white bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        let row_bytes = width.div_ceil(8) as usize;
        Self {
            width,
            height,
            data: vec![0u8; row_bytes * height as usize],
        }
    }

    /// Bytes per packed row.
    pub fn row_bytes(&self) -> usize {
        self.width.div_ceil(8) as usize
    }

    /// Pixel at `(x, y)`; out-of-bounds reads are white.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.row_bytes() + (x / 8) as usize;
        self.data.get(idx).is_some_and(|b| (b >> (7 - x % 8)) & 1 == 1)
    }

    /// Set the pixel at `(x, y)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, black: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * self.row_bytes() + (x / 8) as usize;
        let mask = 1u8 << (7 - x % 8);
        if black {
            self.data[idx] |= mask;
        } else {
            self.data[idx] &= !mask;
        }
    }
}

// ── Elements ─────────────────────────────────────────────────────────────

/// Anchor and field flags shared by every element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Absolute X in dots (label home and shift already applied).
    pub x: i32,
    /// Absolute Y in dots (label home and top already applied).
    pub y: i32,
    /// How the anchor is interpreted.
    pub origin: OriginMode,
    /// Reverse-print flag from `^FR`.
    pub reverse: bool,
}

/// Font snapshot carried by a text element. The rasterizer resolves the
/// actual typeface at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    /// ZPL font identifier (`0`–`9`, `A`–`Z`, or `@`).
    pub id: char,
    /// Character height in dots.
    pub height: u32,
    /// Character width in dots; 0 means proportional.
    pub width: u32,
    /// Field rotation.
    pub orientation: Orientation,
}

/// A positioned text field.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    /// Anchor and flags.
    pub at: Placement,
    /// Decoded field text.
    pub text: String,
    /// Font snapshot at emission time.
    pub font: FontSpec,
    /// Field block snapshot, if `^FB` was active.
    pub block: Option<FieldBlock>,
}

/// A `^GB` box or line.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxElement {
    /// Anchor and flags.
    pub at: Placement,
    /// Outer width in dots.
    pub width: u32,
    /// Outer height in dots.
    pub height: u32,
    /// Border thickness in dots.
    pub border: u32,
    /// Ink color.
    pub color: LineColor,
    /// Corner rounding 0–8 (radius = rounding/8 · min(w,h)/2).
    pub rounding: u8,
}

/// A `^GE`/`^GC` ellipse or circle.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseElement {
    /// Anchor and flags.
    pub at: Placement,
    /// Outer width in dots.
    pub width: u32,
    /// Outer height in dots.
    pub height: u32,
    /// Border thickness in dots.
    pub border: u32,
    /// Ink color.
    pub color: LineColor,
    /// Fill/stroke override.
    pub shape: ShapeOverride,
}

/// A `^GD` diagonal line across a bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagonalElement {
    /// Anchor and flags.
    pub at: Placement,
    /// Bounding box width in dots.
    pub width: u32,
    /// Bounding box height in dots.
    pub height: u32,
    /// Line thickness in dots.
    pub border: u32,
    /// Ink color.
    pub color: LineColor,
    /// `R` leaning (bottom-left to top-right) when true, `L` otherwise.
    pub leaning_right: bool,
}

/// A decoded or recalled 1-bit image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    /// Anchor and flags.
    pub at: Placement,
    /// The 1-bit source bitmap (shared with the graphics cache).
    pub bitmap: Arc<MonoBitmap>,
    /// Integer horizontal magnification.
    pub scale_x: u32,
    /// Integer vertical magnification.
    pub scale_y: u32,
    /// Field rotation.
    pub orientation: Orientation,
}

/// A barcode field awaiting rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeElement {
    /// Anchor and flags.
    pub at: Placement,
    /// Data content (kind-specific ZPL prefixes already stripped by the
    /// executor; Code 128 subset escapes are stripped by the drawer).
    pub content: String,
    /// Symbology.
    pub kind: BarcodeKind,
    /// Narrow module width in dots.
    pub module_width: u32,
    /// Wide-to-narrow ratio (ratio symbologies only).
    pub ratio: f32,
    /// Bar height in dots (linear symbologies only).
    pub height: u32,
    /// Field rotation.
    pub orientation: Orientation,
    /// Interpretation line placement (linear symbologies only).
    pub interpretation: InterpretationLine,
    /// QR error correction level.
    pub error_correction: Option<QrEcLevel>,
    /// Append a check digit (Code 39 / Interleaved 2 of 5).
    pub check_digit: bool,
    /// Requested data columns (PDF417).
    pub columns: Option<u32>,
    /// Requested rows (PDF417).
    pub rows: Option<u32>,
}

/// A single drawable record. See the per-variant structs for field docs.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Text field.
    Text(TextElement),
    /// Box or line.
    Box(BoxElement),
    /// Ellipse or circle.
    Ellipse(EllipseElement),
    /// Diagonal line.
    Diagonal(DiagonalElement),
    /// 1-bit image.
    Image(ImageElement),
    /// Barcode.
    Barcode(BarcodeElement),
}

impl Element {
    /// The anchor and field flags of this element.
    pub fn placement(&self) -> &Placement {
        match self {
            Element::Text(e) => &e.at,
            Element::Box(e) => &e.at,
            Element::Ellipse(e) => &e.at,
            Element::Diagonal(e) => &e.at,
            Element::Image(e) => &e.at,
            Element::Barcode(e) => &e.at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_round_trips_through_chars() {
        for o in [
            Orientation::Normal,
            Orientation::Rot90,
            Orientation::Rot180,
            Orientation::Rot270,
        ] {
            assert_eq!(Orientation::from_char(o.as_char()), o);
        }
        assert_eq!(Orientation::from_char('x'), Orientation::Normal);
    }

    #[test]
    fn mono_bitmap_set_get() {
        let mut bmp = MonoBitmap::new(10, 3);
        assert_eq!(bmp.row_bytes(), 2);
        assert!(!bmp.get(9, 2));
        bmp.set(9, 2, true);
        assert!(bmp.get(9, 2));
        bmp.set(9, 2, false);
        assert!(!bmp.get(9, 2));
        // Out of bounds is white and writes are ignored.
        bmp.set(10, 0, true);
        assert!(!bmp.get(10, 0));
    }
}
