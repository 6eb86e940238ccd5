//! The barcode symbol backend.
//!
//! The rasterizer asks a [`SymbolBackend`] for module patterns and does
//! the scaling/placement itself. The built-in backend covers the linear
//! symbologies (via the encoders in [`crate::oned`]), QR, and PDF417;
//! Data Matrix, Aztec and MaxiCode report [`SymbolError::Unsupported`]
//! and surface as the documented placeholder.

use zpl_preview_core::{BarcodeKind, MonoBitmap, QrEcLevel};

use crate::oned::encode_linear;

/// Options accompanying an encode request.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOptions {
    /// Narrow module width in dots (linear symbologies bake this into the
    /// returned row; matrix symbologies are returned at 1 px per module).
    pub module_width: u32,
    /// Wide-to-narrow ratio for the ratio symbologies.
    pub ratio: f32,
    /// QR error correction level.
    pub error_correction: Option<QrEcLevel>,
    /// Append a check digit (Code 39, Interleaved 2 of 5).
    pub check_digit: bool,
    /// Requested data columns (PDF417).
    pub columns: Option<u32>,
    /// Requested rows (PDF417).
    pub rows: Option<u32>,
}

/// An encoded symbol, ready for scaling.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolPattern {
    /// A 2-D module grid, one pixel per module.
    Matrix(MonoBitmap),
    /// One row of device pixels (module width and ratio already applied);
    /// the drawer extrudes it to the bar height.
    Linear(Vec<bool>),
}

/// Why an encode request failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SymbolError {
    /// The symbology is not covered by this backend.
    #[error("{0} is not supported by this symbol backend")]
    Unsupported(&'static str),
    /// The content cannot be encoded in the symbology.
    #[error("barcode encoding failed: {0}")]
    Encode(String),
}

/// Produces module grids for barcode symbologies.
pub trait SymbolBackend {
    /// Encode `content` for `kind`.
    fn encode(
        &self,
        kind: BarcodeKind,
        content: &str,
        options: &SymbolOptions,
    ) -> Result<SymbolPattern, SymbolError>;
}

/// The built-in backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinSymbols;

impl SymbolBackend for BuiltinSymbols {
    fn encode(
        &self,
        kind: BarcodeKind,
        content: &str,
        options: &SymbolOptions,
    ) -> Result<SymbolPattern, SymbolError> {
        match kind {
            BarcodeKind::Qr => qr_matrix(content, options),
            BarcodeKind::Pdf417 => pdf417_matrix(content, options),
            BarcodeKind::DataMatrix => Err(SymbolError::Unsupported("Data Matrix")),
            BarcodeKind::Aztec => Err(SymbolError::Unsupported("Aztec")),
            BarcodeKind::MaxiCode => Err(SymbolError::Unsupported("MaxiCode")),
            linear => encode_linear(
                linear,
                content,
                options.module_width,
                options.ratio,
                options.check_digit,
            )
            .map(SymbolPattern::Linear)
            .map_err(|e| SymbolError::Encode(e.to_string())),
        }
    }
}

fn qr_matrix(content: &str, options: &SymbolOptions) -> Result<SymbolPattern, SymbolError> {
    use qrcode::{EcLevel, QrCode};

    let level = match options.error_correction.unwrap_or(QrEcLevel::Medium) {
        QrEcLevel::Low => EcLevel::L,
        QrEcLevel::Medium => EcLevel::M,
        QrEcLevel::Quartile => EcLevel::Q,
        QrEcLevel::High => EcLevel::H,
    };
    let code = QrCode::with_error_correction_level(content.as_bytes(), level)
        .map_err(|e| SymbolError::Encode(format!("QR code generation failed: {e}")))?;

    let size = code.width();
    let mut grid = MonoBitmap::new(size as u32, size as u32);
    for y in 0..size {
        for x in 0..size {
            if code[(x, y)] == qrcode::Color::Dark {
                grid.set(x as u32, y as u32, true);
            }
        }
    }
    Ok(SymbolPattern::Matrix(grid))
}

fn pdf417_matrix(content: &str, options: &SymbolOptions) -> Result<SymbolPattern, SymbolError> {
    use pdf417::{END_PATTERN, PDF417, PDF417Encoder, START_PATTERN};

    let cols = options.columns.unwrap_or(5).clamp(1, 30) as usize;
    // Rough codeword need for ASCII text (2 chars per codeword plus
    // length indicator, mode switches, and error correction).
    let needed = content.len() / 2 + 12;
    let min_rows = needed.div_ceil(cols).clamp(3, 90);
    let requested = options.rows.map(|r| r.clamp(3, 90) as usize);

    let mut rows = requested.unwrap_or(min_rows).max(min_rows);
    while rows <= 90 {
        let mut codewords = vec![0u16; rows * cols];
        if let Some((level, filled)) = PDF417Encoder::new(&mut codewords, false)
            .append_ascii(content)
            .fit_seal()
        {
            let width =
                START_PATTERN.size() as usize + 17 + cols * 17 + 17 + END_PATTERN.size() as usize;
            let barcode = PDF417::new(filled, rows as u8, cols as u8, level);
            let mut grid = MonoBitmap::new(width as u32, rows as u32);
            for (i, bit) in barcode.bits().enumerate() {
                if bit {
                    grid.set((i % width) as u32, (i / width) as u32, true);
                }
            }
            return Ok(SymbolPattern::Matrix(grid));
        }
        rows += 4;
    }
    Err(SymbolError::Encode(
        "content does not fit a PDF417 symbol".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SymbolOptions {
        SymbolOptions {
            module_width: 2,
            ratio: 3.0,
            error_correction: None,
            check_digit: false,
            columns: None,
            rows: None,
        }
    }

    #[test]
    fn qr_produces_a_square_grid() {
        let SymbolPattern::Matrix(grid) =
            BuiltinSymbols.encode(BarcodeKind::Qr, "https://example.com", &opts()).unwrap()
        else {
            panic!("expected a matrix");
        };
        assert_eq!(grid.width, grid.height);
        assert!(grid.width >= 21, "at least version 1 (21 modules)");
        // Finder pattern corner module is dark.
        assert!(grid.get(0, 0));
    }

    #[test]
    fn qr_error_correction_changes_the_symbol() {
        let mut low = opts();
        low.error_correction = Some(QrEcLevel::Low);
        let mut high = opts();
        high.error_correction = Some(QrEcLevel::High);
        let a = BuiltinSymbols.encode(BarcodeKind::Qr, "payload-data", &low).unwrap();
        let b = BuiltinSymbols.encode(BarcodeKind::Qr, "payload-data", &high).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn linear_kinds_produce_rows() {
        let SymbolPattern::Linear(row) =
            BuiltinSymbols.encode(BarcodeKind::Code128, "1234", &opts()).unwrap()
        else {
            panic!("expected a linear pattern");
        };
        assert!(row[0]);
        assert!(row.last().copied().unwrap());
    }

    #[test]
    fn unsupported_matrices_report_cleanly() {
        for kind in [
            BarcodeKind::DataMatrix,
            BarcodeKind::Aztec,
            BarcodeKind::MaxiCode,
        ] {
            assert!(matches!(
                BuiltinSymbols.encode(kind, "x", &opts()),
                Err(SymbolError::Unsupported(_))
            ));
        }
    }

    #[test]
    fn bad_linear_content_is_an_encode_error() {
        assert!(matches!(
            BuiltinSymbols.encode(BarcodeKind::Ean13, "ABCDEF", &opts()),
            Err(SymbolError::Encode(_))
        ));
    }
}
