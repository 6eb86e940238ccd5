//! Command registry — maps token codes to typed [`Command`] variants.
//!
//! Commands form a closed set; unrecognized codes produce no command and
//! are surfaced as validator warnings only. Parameter parsing follows the
//! documented grammar for each command: bad numerics fall back to the
//! documented default, out-of-range numerics clamp.

use serde::{Deserialize, Serialize};

use crate::element::{
    BarcodeKind, BlockJustification, FieldBlock, InterpretationLine, LineColor, Orientation,
    QrEcLevel, ShapeOverride,
};
use crate::grammar::args::Params;
use crate::grammar::lexer::Token;

// ── Command payload structs ──────────────────────────────────────────────

/// `^GF` compression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphicFormat {
    /// ASCII hex data (`A`, the conforming case).
    #[default]
    AsciiHex,
    /// Raw binary data (`B`).
    Binary,
    /// Compressed binary data (`C`).
    CompressedBinary,
}

/// An inline `^GF` graphic field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicField {
    /// Compression format.
    pub format: GraphicFormat,
    /// Binary byte count (parameter `b`).
    pub data_bytes: u32,
    /// Total byte count (parameter `c`).
    pub total_bytes: u32,
    /// Bytes per bitmap row (parameter `d`).
    pub row_bytes: u32,
    /// Raw (undecoded) data text.
    pub data: String,
}

/// A `~DG` stored-graphic download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadGraphic {
    /// Storage name, possibly with a drive prefix (`R:LOGO.GRF`).
    pub name: String,
    /// Total byte count.
    pub total_bytes: u32,
    /// Bytes per bitmap row.
    pub row_bytes: u32,
    /// Raw (undecoded) data text.
    pub data: String,
}

/// A `^B…` barcode declaration, staged until the next `^FD` supplies data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodeField {
    /// Symbology.
    pub kind: BarcodeKind,
    /// Field rotation; `None` uses the default (normal).
    pub orientation: Option<Orientation>,
    /// Bar height in dots (linear) or row height (PDF417); `None` uses the
    /// `^BY` default.
    pub height: Option<u32>,
    /// Interpretation line placement; `None` for matrix symbologies.
    pub interpretation: Option<InterpretationLine>,
    /// Module magnification override (QR, Aztec, Data Matrix).
    pub magnification: Option<u32>,
    /// QR error correction level.
    pub error_correction: Option<QrEcLevel>,
    /// Append a check digit (Code 39, Interleaved 2 of 5).
    pub check_digit: bool,
    /// Requested data columns (PDF417).
    pub columns: Option<u32>,
    /// Requested rows (PDF417).
    pub rows: Option<u32>,
}

impl BarcodeField {
    fn new(kind: BarcodeKind) -> Self {
        Self {
            kind,
            orientation: None,
            height: None,
            interpretation: None,
            magnification: None,
            error_correction: None,
            check_digit: false,
            columns: None,
            rows: None,
        }
    }
}

// ── The command sum type ─────────────────────────────────────────────────

/// One parsed ZPL command.
///
/// Variants are grouped by family; accepted no-ops carry their parsed
/// parameters (where any) so the emitter can reconstruct them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// `^XA` — begin a label frame, resetting per-label state.
    LabelStart,
    /// `^XZ` — end the label frame.
    LabelEnd,
    /// `^FS` — end the current field, resetting per-field state.
    FieldSeparator,
    /// `^FO x,y` — set position, top-left origin mode.
    FieldOrigin {
        /// X in dots.
        x: i32,
        /// Y in dots.
        y: i32,
    },
    /// `^FT x,y` — set position, baseline origin mode.
    FieldTypeset {
        /// X in dots.
        x: i32,
        /// Y in dots.
        y: i32,
    },
    /// `^LH x,y` — label home offset.
    LabelHome {
        /// Home X in dots.
        x: i32,
        /// Home Y in dots.
        y: i32,
    },
    /// `^LS s` — horizontal label shift.
    LabelShift {
        /// Shift in dots (may be negative).
        shift: i32,
    },
    /// `^LT t` — vertical label top offset.
    LabelTop {
        /// Top offset in dots (may be negative).
        top: i32,
    },
    /// `^FW` — default field orientation (accepted metadata, no effect).
    FieldOrientationDefault {
        /// Orientation character as given.
        orientation: Option<Orientation>,
    },
    /// `^PW w` — print width in dots.
    PrintWidth {
        /// Width in dots; `None` when the parameter was absent or invalid.
        dots: Option<u32>,
    },
    /// `^LL l` — label length in dots.
    LabelLength {
        /// Length in dots; `None` when the parameter was absent or invalid.
        dots: Option<u32>,
    },
    /// `^PO` — print orientation.
    PrintOrientation {
        /// `true` for `I` (rotate the whole label 180°).
        inverted: bool,
    },
    /// `^PQ q` — print quantity (metadata).
    PrintQuantity {
        /// Requested label count.
        quantity: u32,
    },
    /// `^MD` — media darkness (accepted no-op).
    MediaDarkness,
    /// `^PR` — print rate (accepted no-op).
    PrintRate,
    /// `^MM` — print mode (accepted no-op).
    PrintMode,
    /// `^FB` — field block for the next text field.
    FieldBlock(FieldBlock),
    /// `^FR` — reverse print for the current field.
    FieldReverse,
    /// `^FH` — enable hex escapes for the current field.
    FieldHex {
        /// Escape indicator character (default `_`).
        indicator: char,
    },
    /// `^FN n` — field number (accepted metadata).
    FieldNumber {
        /// Field number.
        number: u32,
    },
    /// `^FD` — field data.
    FieldData {
        /// Raw payload text (trimmed; hex escapes not yet decoded).
        data: String,
    },
    /// `^SN` — serialization field; renders its start value.
    SerializationField {
        /// Start value text.
        start: String,
        /// Per-label increment (metadata).
        increment: i32,
        /// Keep leading zeros.
        leading_zeros: bool,
    },
    /// `^FV` — variable field data; renders like `^FD`.
    FieldVariable {
        /// Raw payload text.
        data: String,
    },
    /// `^A<id>` — select a bitmap font.
    FontSelect {
        /// Font identifier (`0`–`9`, `A`–`Z`).
        id: char,
        /// Rotation, when given.
        orientation: Option<Orientation>,
        /// Height in dots, when given.
        height: Option<u32>,
        /// Width in dots, when given (0 means proportional).
        width: Option<u32>,
    },
    /// `^A@` — select a scalable font by stored name.
    ScalableFont {
        /// Rotation, when given.
        orientation: Option<Orientation>,
        /// Height in dots, when given.
        height: Option<u32>,
        /// Width in dots, when given.
        width: Option<u32>,
        /// Stored font name (`d:o.x`), kept for round-tripping.
        name: Option<String>,
    },
    /// `^CF` — change the default font.
    FontDefault {
        /// Font identifier, when given.
        id: Option<char>,
        /// Height in dots, when given.
        height: Option<u32>,
        /// Width in dots, when given.
        width: Option<u32>,
    },
    /// `^CI` — change the text encoding.
    ChangeEncoding {
        /// Encoding id (28 = UTF-8).
        id: u32,
    },
    /// `^GB` — box or line.
    GraphicBox {
        /// Outer width in dots.
        width: u32,
        /// Outer height in dots.
        height: u32,
        /// Border thickness in dots.
        border: u32,
        /// Ink color.
        color: LineColor,
        /// Corner rounding 0–8.
        rounding: u8,
    },
    /// `^GC` — circle.
    GraphicCircle {
        /// Diameter in dots.
        diameter: u32,
        /// Border thickness in dots.
        border: u32,
        /// Ink color.
        color: LineColor,
    },
    /// `^GD` — diagonal line.
    GraphicDiagonal {
        /// Bounding box width in dots.
        width: u32,
        /// Bounding box height in dots.
        height: u32,
        /// Line thickness in dots.
        border: u32,
        /// Ink color.
        color: LineColor,
        /// `R` leaning (bottom-left to top-right) when true.
        leaning_right: bool,
    },
    /// `^GE` — ellipse.
    GraphicEllipse {
        /// Outer width in dots.
        width: u32,
        /// Outer height in dots.
        height: u32,
        /// Border thickness in dots.
        border: u32,
        /// Ink color.
        color: LineColor,
        /// Fill/stroke override.
        shape: ShapeOverride,
    },
    /// `^GF` — inline graphic field.
    GraphicField(GraphicField),
    /// `~DG` — download a graphic into the cache.
    DownloadGraphic(DownloadGraphic),
    /// `^XG` — recall a cached graphic.
    RecallGraphic {
        /// Storage name.
        name: String,
        /// Integer horizontal magnification (1–10).
        scale_x: u32,
        /// Integer vertical magnification (1–10).
        scale_y: u32,
    },
    /// `^IM` — recall a cached graphic at 1:1.
    ImageMove {
        /// Storage name.
        name: String,
    },
    /// `^BY` — barcode field defaults.
    BarcodeDefaults {
        /// Narrow module width in dots (1–10), when given.
        module_width: Option<u32>,
        /// Wide-to-narrow ratio (2.0–3.0), when given.
        ratio: Option<f32>,
        /// Default bar height in dots, when given and non-zero.
        height: Option<u32>,
    },
    /// Any `^B…` symbology declaration.
    Barcode(BarcodeField),
    /// `^FX` — comment, no effect.
    Comment {
        /// Comment text.
        text: String,
    },
}

// ── Registry ─────────────────────────────────────────────────────────────

/// Codes the registry understands, excluding the `A<id>` font-select family
/// which is matched structurally.
const KNOWN_CODES: &[&str] = &[
    "XA", "XZ", "FS", "FO", "FT", "LH", "LS", "LT", "FW", "PW", "LL", "PO", "PQ", "MD", "PR",
    "MM", "FB", "FR", "FH", "FN", "FD", "SN", "FV", "CF", "CI", "GB", "GC", "GD", "GE", "GF",
    "DG", "XG", "IM", "BY", "BC", "B3", "BE", "BA", "BU", "BQ", "BX", "B7", "B0", "BD", "B2",
    "BK", "FX",
];

/// Whether `code` (without prefix, uppercased) is in the supported set.
pub fn is_supported_code(code: &str) -> bool {
    if KNOWN_CODES.contains(&code) {
        return true;
    }
    // Font select: `A` followed by a font identifier or `@`.
    let mut chars = code.chars();
    chars.next() == Some('A')
        && matches!(chars.next(), Some(c) if c.is_ascii_alphanumeric() || c == '@')
        && chars.next().is_none()
}

/// Parse a token into a typed command.
///
/// Returns `None` for codes outside the supported set; the caller decides
/// whether that is worth a warning. Parameter issues recorded while
/// parsing are returned alongside the command.
pub fn parse_token(tok: &Token<'_>) -> Option<(Command, Vec<super::args::ParamIssue>)> {
    let mut p = Params::split(tok.payload);
    let cmd = match tok.code.as_str() {
        "XA" => Command::LabelStart,
        "XZ" => Command::LabelEnd,
        "FS" => Command::FieldSeparator,
        "FO" => Command::FieldOrigin {
            x: p.clamp_i32(0, 0, 0, 32000),
            y: p.clamp_i32(1, 0, 0, 32000),
        },
        "FT" => Command::FieldTypeset {
            x: p.clamp_i32(0, 0, 0, 32000),
            y: p.clamp_i32(1, 0, 0, 32000),
        },
        "LH" => Command::LabelHome {
            x: p.clamp_i32(0, 0, 0, 32000),
            y: p.clamp_i32(1, 0, 0, 32000),
        },
        "LS" => Command::LabelShift {
            shift: p.clamp_i32(0, 0, -9999, 9999),
        },
        "LT" => Command::LabelTop {
            top: p.clamp_i32(0, 0, -120, 120),
        },
        "FW" => Command::FieldOrientationDefault {
            orientation: p.char_at(0).map(Orientation::from_char),
        },
        "PW" => Command::PrintWidth { dots: p.u32(0) },
        "LL" => Command::LabelLength { dots: p.u32(0) },
        "PO" => Command::PrintOrientation {
            inverted: p.char_or(0, 'N') == 'I',
        },
        "PQ" => Command::PrintQuantity {
            quantity: p.u32_or(0, 1),
        },
        "MD" => Command::MediaDarkness,
        "PR" => Command::PrintRate,
        "MM" => Command::PrintMode,
        "FB" => Command::FieldBlock(FieldBlock {
            width: p.u32_or(0, 0),
            max_lines: p.clamp_u32(1, 1, 1, 9999),
            line_spacing: p.clamp_i32(2, 0, -9999, 9999),
            justification: BlockJustification::from_char(p.char_or(3, 'L')),
            hanging_indent: p.u32_or(4, 0),
        }),
        "FR" => Command::FieldReverse,
        "FH" => Command::FieldHex {
            // The indicator is the payload's first non-blank character.
            indicator: tok.payload.trim().chars().next().unwrap_or('_'),
        },
        "FN" => Command::FieldNumber {
            number: p.u32_or(0, 0),
        },
        "FD" => Command::FieldData {
            data: tok.payload.trim().to_string(),
        },
        "SN" => Command::SerializationField {
            start: p.string(0).unwrap_or_default(),
            increment: p.i32_or(1, 1),
            leading_zeros: p.flag_or(2, false),
        },
        "FV" => Command::FieldVariable {
            data: tok.payload.trim().to_string(),
        },
        "A@" => Command::ScalableFont {
            orientation: p.char_at(0).map(Orientation::from_char),
            height: p.u32(1).filter(|v| *v > 0),
            width: p.u32(2).filter(|v| *v > 0),
            name: p.string(3),
        },
        "CF" => Command::FontDefault {
            id: p.char_at(0),
            height: p.u32(1).filter(|v| *v > 0),
            width: p.u32(2),
        },
        "CI" => Command::ChangeEncoding { id: p.u32_or(0, 0) },
        "GB" => {
            let border = p.clamp_u32(2, 1, 1, 32000);
            // Width and height default to the border thickness; values at
            // or below it make the drawer fill (ZPL's way of drawing lines).
            Command::GraphicBox {
                width: p.u32_or(0, border),
                height: p.u32_or(1, border),
                border,
                color: LineColor::from_char(p.char_or(3, 'B')),
                rounding: p.clamp_u32(4, 0, 0, 8) as u8,
            }
        }
        "GC" => {
            let border = p.clamp_u32(1, 1, 1, 4095);
            Command::GraphicCircle {
                diameter: p.u32_or(0, 3).max(3),
                border,
                color: LineColor::from_char(p.char_or(2, 'B')),
            }
        }
        "GD" => {
            let border = p.clamp_u32(2, 1, 1, 32000);
            Command::GraphicDiagonal {
                width: p.u32_or(0, 3),
                height: p.u32_or(1, 3),
                border,
                color: LineColor::from_char(p.char_or(3, 'B')),
                leaning_right: p.char_or(4, 'R') != 'L',
            }
        }
        "GE" => {
            let border = p.clamp_u32(2, 1, 1, 4095);
            Command::GraphicEllipse {
                width: p.u32_or(0, border),
                height: p.u32_or(1, border),
                border,
                color: LineColor::from_char(p.char_or(3, 'B')),
                shape: match p.char_at(4) {
                    Some('F') => ShapeOverride::Fill,
                    Some('S') => ShapeOverride::Stroke,
                    _ => ShapeOverride::None,
                },
            }
        }
        "GF" => return Some((parse_graphic_field(tok.payload), p.take_issues())),
        "DG" => return Some((parse_download_graphic(tok.payload), p.take_issues())),
        "XG" => Command::RecallGraphic {
            name: p.string(0).unwrap_or_default(),
            scale_x: p.clamp_u32(1, 1, 1, 10),
            scale_y: p.clamp_u32(2, 1, 1, 10),
        },
        "IM" => Command::ImageMove {
            name: p.string(0).unwrap_or_default(),
        },
        "BY" => Command::BarcodeDefaults {
            module_width: p.u32(0).map(|v| v.clamp(1, 10)),
            ratio: p.f32(1).map(|v| v.clamp(2.0, 3.0)),
            height: p.u32(2).filter(|v| *v > 0),
        },
        "BC" => {
            let mut b = BarcodeField::new(BarcodeKind::Code128);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.height = p.u32(1).filter(|v| *v > 0);
            b.interpretation = Some(interpretation(&p, 2, 3));
            Command::Barcode(b)
        }
        "B3" => {
            let mut b = BarcodeField::new(BarcodeKind::Code39);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.check_digit = p.flag_or(1, false);
            b.height = p.u32(2).filter(|v| *v > 0);
            b.interpretation = Some(interpretation(&p, 3, 4));
            Command::Barcode(b)
        }
        "BE" => {
            let mut b = BarcodeField::new(BarcodeKind::Ean13);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.height = p.u32(1).filter(|v| *v > 0);
            b.interpretation = Some(interpretation(&p, 2, 3));
            Command::Barcode(b)
        }
        "BA" => {
            let mut b = BarcodeField::new(BarcodeKind::Code93);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.height = p.u32(1).filter(|v| *v > 0);
            b.interpretation = Some(interpretation(&p, 2, 3));
            Command::Barcode(b)
        }
        "BU" => {
            let mut b = BarcodeField::new(BarcodeKind::UpcA);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.height = p.u32(1).filter(|v| *v > 0);
            b.interpretation = Some(interpretation(&p, 2, 3));
            Command::Barcode(b)
        }
        "B2" => {
            let mut b = BarcodeField::new(BarcodeKind::Interleaved2of5);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.height = p.u32(1).filter(|v| *v > 0);
            b.interpretation = Some(interpretation(&p, 2, 3));
            b.check_digit = p.flag_or(4, false);
            Command::Barcode(b)
        }
        "BK" => {
            let mut b = BarcodeField::new(BarcodeKind::Codabar);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.check_digit = p.flag_or(1, false);
            b.height = p.u32(2).filter(|v| *v > 0);
            b.interpretation = Some(interpretation(&p, 3, 4));
            Command::Barcode(b)
        }
        "BQ" => {
            let mut b = BarcodeField::new(BarcodeKind::Qr);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            // Parameter 1 is the QR model; only model 2 is rendered.
            b.magnification = p.u32(2).map(|v| v.clamp(1, 10));
            b.error_correction =
                Some(p.char_at(3).and_then(QrEcLevel::from_char).unwrap_or(QrEcLevel::Medium));
            Command::Barcode(b)
        }
        "BX" => {
            let mut b = BarcodeField::new(BarcodeKind::DataMatrix);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            // Parameter 1 is the element height; it scales the modules.
            b.magnification = p.u32(1).map(|v| v.clamp(1, 100));
            b.columns = p.u32(3);
            b.rows = p.u32(4);
            Command::Barcode(b)
        }
        "B7" => {
            let mut b = BarcodeField::new(BarcodeKind::Pdf417);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.height = p.u32(1).filter(|v| *v > 0);
            b.columns = p.u32(3).map(|v| v.clamp(1, 30));
            b.rows = p.u32(4).map(|v| v.clamp(3, 90));
            Command::Barcode(b)
        }
        "B0" => {
            let mut b = BarcodeField::new(BarcodeKind::Aztec);
            b.orientation = p.char_at(0).map(Orientation::from_char);
            b.magnification = p.u32(1).map(|v| v.clamp(1, 10));
            Command::Barcode(b)
        }
        "BD" => Command::Barcode(BarcodeField::new(BarcodeKind::MaxiCode)),
        "FX" => Command::Comment {
            text: tok.payload.trim().to_string(),
        },
        code => {
            // Font select: the second code character is the font identifier.
            let mut chars = code.chars();
            if chars.next() == Some('A')
                && let Some(id) = chars.next().filter(|c| c.is_ascii_alphanumeric())
                && chars.next().is_none()
            {
                let cmd = Command::FontSelect {
                    id,
                    orientation: p.char_at(0).map(Orientation::from_char),
                    height: p.u32(1).filter(|v| *v > 0),
                    width: p.u32(2),
                };
                return Some((cmd, p.take_issues()));
            }
            return None;
        }
    };
    Some((cmd, p.take_issues()))
}

/// Interpretation-line placement from the `print line` / `line above`
/// flag pair (defaults `Y`, `N`).
fn interpretation(p: &Params<'_>, print_idx: usize, above_idx: usize) -> InterpretationLine {
    match (p.flag_or(print_idx, true), p.flag_or(above_idx, false)) {
        (false, _) => InterpretationLine::Off,
        (true, true) => InterpretationLine::Above,
        (true, false) => InterpretationLine::Below,
    }
}

/// `^GF a,b,c,d,data` — the data is everything after the fourth comma and
/// may itself contain commas (run-length codes).
fn parse_graphic_field(payload: &str) -> Command {
    let mut it = payload.splitn(5, ',');
    let a = it.next().unwrap_or("").trim();
    let b = it.next().unwrap_or("").trim();
    let c = it.next().unwrap_or("").trim();
    let d = it.next().unwrap_or("").trim();
    let data = it.next().unwrap_or("");

    let total: u32 = c.parse().or_else(|_| b.parse()).unwrap_or(0);
    Command::GraphicField(GraphicField {
        format: match a.chars().next().map(|ch| ch.to_ascii_uppercase()) {
            Some('B') => GraphicFormat::Binary,
            Some('C') => GraphicFormat::CompressedBinary,
            _ => GraphicFormat::AsciiHex,
        },
        data_bytes: b.parse().unwrap_or(total),
        total_bytes: total,
        row_bytes: d.parse().unwrap_or(0),
        data: data.to_string(),
    })
}

/// `~DG name,t,w,data`.
fn parse_download_graphic(payload: &str) -> Command {
    let mut it = payload.splitn(4, ',');
    let name = it.next().unwrap_or("").trim();
    let t = it.next().unwrap_or("").trim();
    let w = it.next().unwrap_or("").trim();
    let data = it.next().unwrap_or("");

    Command::DownloadGraphic(DownloadGraphic {
        name: name.to_string(),
        total_bytes: t.parse().unwrap_or(0),
        row_bytes: w.parse().unwrap_or(0),
        data: data.to_string(),
    })
}
