//! Graphic data decoding for `^GF` and `~DG`.
//!
//! ASCII data is hex, two digits per byte, with the ZPL run-length scheme
//! layered on top: `G`–`Z` add 1–20 to a repeat count, `g`–`z` add
//! 20–400, `,` fills the rest of the row white, `!` fills it black, and
//! `:` repeats the previous row. `:Z64:…:crc` payloads are base64 + zlib.
//! Missing trailing data renders as white.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::io::Read as _;

use crate::element::MonoBitmap;
use crate::grammar::command::GraphicFormat;

/// Decode budget: no real label needs more bitmap than this, and the
/// limit keeps hostile headers (or Z64 bombs) from exhausting memory.
const MAX_GRAPHIC_BYTES: u32 = 8 * 1024 * 1024;
/// Widest supported row (65 536 dots).
const MAX_ROW_BYTES: u32 = 8192;

/// Why a graphic payload failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicError {
    /// The header declared no row width.
    MissingRowWidth,
    /// The declared size exceeds the decode budget.
    TooLarge {
        /// Declared total bytes.
        total: u32,
        /// Declared row bytes.
        row: u32,
    },
    /// A `:Z64:`/`:B64:` envelope failed to decode.
    BadEnvelope(String),
}

impl std::fmt::Display for GraphicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphicError::MissingRowWidth => write!(f, "graphic data has no row width"),
            GraphicError::TooLarge { total, row } => write!(
                f,
                "graphic of {total} bytes ({row} per row) exceeds the decode budget"
            ),
            GraphicError::BadEnvelope(e) => write!(f, "bad Z64/B64 graphic envelope: {e}"),
        }
    }
}

impl std::error::Error for GraphicError {}

/// Decode a graphic payload into a 1-bit bitmap of `row_bytes·8` columns.
pub fn decode_graphic(
    data: &str,
    format: GraphicFormat,
    total_bytes: u32,
    row_bytes: u32,
) -> Result<MonoBitmap, GraphicError> {
    if row_bytes == 0 {
        return Err(GraphicError::MissingRowWidth);
    }
    if row_bytes > MAX_ROW_BYTES || total_bytes > MAX_GRAPHIC_BYTES {
        return Err(GraphicError::TooLarge {
            total: total_bytes,
            row: row_bytes,
        });
    }
    let trimmed = data.trim_start();
    if trimmed.starts_with(":Z64:") || trimmed.starts_with(":B64:") {
        let bytes = decode_envelope(trimmed)?;
        return Ok(from_packed(&bytes, total_bytes, row_bytes));
    }
    match format {
        GraphicFormat::AsciiHex => Ok(decode_ascii(data, total_bytes, row_bytes)),
        // Binary payloads arrive as the raw byte view of the source slice.
        GraphicFormat::Binary | GraphicFormat::CompressedBinary => {
            Ok(from_packed(data.as_bytes(), total_bytes, row_bytes))
        }
    }
}

/// Assemble packed row bytes into a bitmap; short data leaves white rows.
fn from_packed(bytes: &[u8], total_bytes: u32, row_bytes: u32) -> MonoBitmap {
    let total = if total_bytes > 0 {
        total_bytes as usize
    } else {
        bytes.len()
    };
    let height = total.div_ceil(row_bytes as usize) as u32;
    let mut bmp = MonoBitmap::new(row_bytes * 8, height);
    let n = bytes.len().min(bmp.data.len());
    bmp.data[..n].copy_from_slice(&bytes[..n]);
    bmp
}

fn decode_envelope(data: &str) -> Result<Vec<u8>, GraphicError> {
    // ":Z64:<base64>:<crc16>" — the trailing CRC is informational here.
    let compressed = data.starts_with(":Z64:");
    let body = &data[5..];
    let body = body.split(':').next().unwrap_or(body);
    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = BASE64
        .decode(cleaned.as_bytes())
        .map_err(|e| GraphicError::BadEnvelope(e.to_string()))?;
    if !compressed {
        return Ok(raw);
    }
    let mut out = Vec::new();
    // The budget also bounds decompression so a tiny Z64 payload cannot
    // inflate without limit.
    flate2::read::ZlibDecoder::new(raw.as_slice())
        .take(MAX_GRAPHIC_BYTES as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| GraphicError::BadEnvelope(e.to_string()))?;
    if out.len() as u64 > MAX_GRAPHIC_BYTES as u64 {
        return Err(GraphicError::BadEnvelope("inflated data exceeds budget".into()));
    }
    Ok(out)
}

/// Decode ASCII hex rows, honoring the run-length scheme.
fn decode_ascii(data: &str, total_bytes: u32, row_bytes: u32) -> MonoBitmap {
    let nibbles_per_row = row_bytes as usize * 2;
    let height = if total_bytes > 0 {
        (total_bytes as usize).div_ceil(row_bytes as usize)
    } else {
        // No declared length: size from the data, one row minimum,
        // still subject to the decode budget.
        estimate_rows(data, nibbles_per_row)
            .min((MAX_GRAPHIC_BYTES / row_bytes) as usize)
    };
    let mut bmp = MonoBitmap::new(row_bytes * 8, height as u32);

    let mut row = 0usize;
    let mut nib = 0usize;
    let mut repeat = 0usize;
    for ch in data.chars() {
        if row >= height {
            break;
        }
        match ch {
            c if c.is_ascii_hexdigit() => {
                let v = c.to_digit(16).unwrap() as u8;
                let count = repeat.max(1);
                repeat = 0;
                for _ in 0..count {
                    if row >= height {
                        break;
                    }
                    set_nibble(&mut bmp, row, nib, v);
                    nib += 1;
                    if nib >= nibbles_per_row {
                        nib = 0;
                        row += 1;
                    }
                }
            }
            'G'..='Z' => repeat += ch as usize - 'F' as usize,
            'g'..='z' => repeat += (ch as usize - 'f' as usize) * 20,
            ',' => {
                // Rest of the row is already white.
                nib = 0;
                row += 1;
                repeat = 0;
            }
            '!' => {
                while nib < nibbles_per_row {
                    set_nibble(&mut bmp, row, nib, 0xF);
                    nib += 1;
                }
                nib = 0;
                row += 1;
                repeat = 0;
            }
            ':' => {
                // Repeat the previous row (only meaningful at a row start).
                if nib == 0 && row > 0 && row < height {
                    let rb = bmp.row_bytes();
                    let (src, dst) = bmp.data.split_at_mut(row * rb);
                    dst[..rb].copy_from_slice(&src[(row - 1) * rb..][..rb]);
                }
                row += 1;
                repeat = 0;
            }
            c if c.is_whitespace() => {}
            // Unknown character: ignore, keep scanning.
            _ => {}
        }
    }
    bmp
}

fn set_nibble(bmp: &mut MonoBitmap, row: usize, nib: usize, v: u8) {
    let rb = bmp.row_bytes();
    let idx = row * rb + nib / 2;
    if let Some(byte) = bmp.data.get_mut(idx) {
        if nib % 2 == 0 {
            *byte = (*byte & 0x0F) | (v << 4);
        } else {
            *byte = (*byte & 0xF0) | (v & 0x0F);
        }
    }
}

/// Rows needed for undeclared-length data (rough, for resilience only).
fn estimate_rows(data: &str, nibbles_per_row: usize) -> usize {
    let mut rows = 0usize;
    let mut nib = 0usize;
    let mut repeat = 0usize;
    for ch in data.chars() {
        match ch {
            c if c.is_ascii_hexdigit() => {
                nib += repeat.max(1);
                repeat = 0;
                while nib >= nibbles_per_row {
                    nib -= nibbles_per_row;
                    rows += 1;
                }
            }
            'G'..='Z' => repeat += ch as usize - 'F' as usize,
            'g'..='z' => repeat += (ch as usize - 'f' as usize) * 20,
            ',' | '!' | ':' => {
                rows += 1;
                nib = 0;
                repeat = 0;
            }
            _ => {}
        }
    }
    if nib > 0 {
        rows += 1;
    }
    rows.max(1)
}
