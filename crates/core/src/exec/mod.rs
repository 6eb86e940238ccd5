//! The command executor: drives [`ExecutionState`] and emits elements.
//!
//! Executes a parsed command sequence in order. Stateful commands mutate
//! the modal state; field and graphic commands append [`Element`]s whose
//! anchors are snapshotted from the state in effect at emission time.
//! Recoverable problems become warnings, never failures.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::element::{
    BarcodeElement, BarcodeKind, BoxElement, DiagonalElement, Element, EllipseElement,
    ImageElement, LineColor, Placement, TextElement,
};
use crate::grammar::command::{BarcodeField, Command, GraphicFormat};
use crate::grammar::diag::{Diagnostic, Span, codes};
use crate::grammar::label::{Label, ParsedCommand};
use crate::graphic::decode_graphic;
use crate::hex::{decode_field_bytes, decode_text};
use crate::state::{ExecutionState, PendingBarcode};

/// Result of executing a command sequence.
pub struct Execution {
    /// Emitted elements, in order.
    pub elements: Vec<Element>,
    /// Recoverable problems found while executing.
    pub warnings: Vec<Diagnostic>,
    /// Final state (print width, label length, quantity, …).
    pub state: ExecutionState,
}

/// Execute a parsed label.
pub fn execute(label: &Label) -> Execution {
    execute_commands(&label.commands)
}

/// Execute a raw command sequence.
pub fn execute_commands(commands: &[ParsedCommand]) -> Execution {
    let mut exec = Executor {
        state: ExecutionState::new(),
        elements: Vec::new(),
        warnings: Vec::new(),
    };
    for parsed in commands {
        exec.apply(&parsed.command, parsed.span);
    }
    Execution {
        elements: exec.elements,
        warnings: exec.warnings,
        state: exec.state,
    }
}

struct Executor {
    state: ExecutionState,
    elements: Vec<Element>,
    warnings: Vec<Diagnostic>,
}

impl Executor {
    fn apply(&mut self, cmd: &Command, span: Span) {
        match cmd {
            Command::LabelStart => self.state.reset_label(),
            Command::LabelEnd => {}
            Command::FieldSeparator => self.state.clear_field(),

            Command::FieldOrigin { x, y } => self.set_position(*x, *y, false),
            Command::FieldTypeset { x, y } => self.set_position(*x, *y, true),
            Command::LabelHome { x, y } => {
                self.state.home_x = *x;
                self.state.home_y = *y;
            }
            Command::LabelShift { shift } => self.state.shift_x = *shift,
            Command::LabelTop { top } => self.state.top_y = *top,

            Command::PrintWidth { dots } => {
                if dots.is_some() {
                    self.state.print_width = *dots;
                }
            }
            Command::LabelLength { dots } => {
                if dots.is_some() {
                    self.state.label_length = *dots;
                }
            }
            Command::PrintOrientation { inverted } => self.state.inverted = *inverted,
            Command::PrintQuantity { quantity } => self.state.quantity = *quantity,

            // Accepted no-ops and metadata.
            Command::FieldOrientationDefault { .. }
            | Command::MediaDarkness
            | Command::PrintRate
            | Command::PrintMode
            | Command::FieldNumber { .. }
            | Command::Comment { .. } => {}

            Command::FieldBlock(fb) => {
                let mut fb = fb.clone();
                fb.width = fb.width.min(32000);
                self.state.field.block = Some(fb);
            }
            Command::FieldReverse => self.state.field.reverse = true,
            Command::FieldHex { indicator } => {
                self.state.field.hex_indicator = Some(*indicator);
            }

            Command::FontSelect {
                id,
                orientation,
                height,
                width,
            } => {
                self.state.font.id = *id;
                if let Some(o) = orientation {
                    self.state.font.orientation = *o;
                }
                if let Some(h) = height {
                    self.state.font.height = (*h).min(32000);
                }
                if let Some(w) = width {
                    self.state.font.width = (*w).min(32000);
                }
            }
            Command::ScalableFont {
                orientation,
                height,
                width,
                ..
            } => {
                self.state.font.id = '@';
                if let Some(o) = orientation {
                    self.state.font.orientation = *o;
                }
                if let Some(h) = height {
                    self.state.font.height = (*h).min(32000);
                }
                if let Some(w) = width {
                    self.state.font.width = (*w).min(32000);
                }
            }
            Command::FontDefault { id, height, width } => {
                if let Some(id) = id {
                    self.state.font.id = *id;
                }
                if let Some(h) = height {
                    self.state.font.height = (*h).min(32000);
                }
                if let Some(w) = width {
                    self.state.font.width = (*w).min(32000);
                }
            }
            Command::ChangeEncoding { id } => self.state.encoding = *id,

            Command::GraphicBox {
                width,
                height,
                border,
                color,
                rounding,
            } => {
                let at = self.placement();
                self.elements.push(Element::Box(BoxElement {
                    at,
                    width: *width,
                    height: *height,
                    border: *border,
                    color: *color,
                    rounding: *rounding,
                }));
            }
            Command::GraphicCircle {
                diameter,
                border,
                color,
            } => {
                let at = self.placement();
                self.elements.push(Element::Ellipse(EllipseElement {
                    at,
                    width: *diameter,
                    height: *diameter,
                    border: *border,
                    color: *color,
                    shape: crate::element::ShapeOverride::None,
                }));
            }
            Command::GraphicDiagonal {
                width,
                height,
                border,
                color,
                leaning_right,
            } => {
                let at = self.placement();
                self.elements.push(Element::Diagonal(DiagonalElement {
                    at,
                    width: *width,
                    height: *height,
                    border: *border,
                    color: *color,
                    leaning_right: *leaning_right,
                }));
            }
            Command::GraphicEllipse {
                width,
                height,
                border,
                color,
                shape,
            } => {
                let at = self.placement();
                self.elements.push(Element::Ellipse(EllipseElement {
                    at,
                    width: *width,
                    height: *height,
                    border: *border,
                    color: *color,
                    shape: *shape,
                }));
            }

            Command::GraphicField(gf) => self.graphic_field(gf, span),
            Command::DownloadGraphic(dg) => self.download_graphic(dg, span),
            Command::RecallGraphic {
                name,
                scale_x,
                scale_y,
            } => self.recall_graphic(name, *scale_x, *scale_y),
            Command::ImageMove { name } => self.recall_graphic(name, 1, 1),

            Command::BarcodeDefaults {
                module_width,
                ratio,
                height,
            } => {
                if let Some(w) = module_width {
                    self.state.barcode.module_width = *w;
                }
                if let Some(r) = ratio {
                    self.state.barcode.ratio = *r;
                }
                if let Some(h) = height {
                    self.state.barcode.height = (*h).min(32000);
                }
            }
            Command::Barcode(bf) => self.stage_barcode(bf),

            Command::FieldData { data } => self.field_data(data, span),
            Command::FieldVariable { data } => self.field_data(data, span),
            Command::SerializationField { start, .. } => self.field_data(start, span),
        }
    }

    /// `^FO`/`^FT`: position plus origin mode; block, reverse, and hex
    /// state are cleared, a staged barcode survives.
    fn set_position(&mut self, x: i32, y: i32, baseline: bool) {
        self.state.x = x;
        self.state.y = y;
        self.state.origin = if baseline {
            crate::element::OriginMode::Baseline
        } else {
            crate::element::OriginMode::TopLeft
        };
        self.state.field.block = None;
        self.state.field.reverse = false;
        self.state.field.hex_indicator = None;
    }

    fn placement(&self) -> Placement {
        let (x, y) = self.state.anchor();
        Placement {
            x,
            y,
            origin: self.state.origin,
            reverse: self.state.field.reverse,
        }
    }

    /// Stage a barcode descriptor for the next `^FD`, resolving heights
    /// and module widths against the `^BY` defaults in effect now.
    fn stage_barcode(&mut self, bf: &BarcodeField) {
        let defaults = self.state.barcode;
        let module_width = match bf.kind {
            BarcodeKind::Qr | BarcodeKind::Aztec => bf.magnification.unwrap_or(2),
            BarcodeKind::DataMatrix => bf.magnification.unwrap_or(defaults.module_width),
            _ => defaults.module_width,
        };
        self.state.field.pending_barcode = Some(PendingBarcode {
            kind: bf.kind,
            orientation: bf.orientation.unwrap_or_default(),
            module_width,
            ratio: defaults.ratio,
            height: bf.height.unwrap_or(defaults.height).min(32000),
            interpretation: bf.interpretation.unwrap_or(crate::element::InterpretationLine::Off),
            error_correction: bf.error_correction,
            check_digit: bf.check_digit,
            columns: bf.columns,
            rows: bf.rows,
        });
    }

    /// `^FD`/`^FV`/`^SN`: finalize the current field into an element.
    fn field_data(&mut self, data: &str, span: Span) {
        let (bytes, escape_issues) =
            decode_field_bytes(data, self.state.field.hex_indicator);
        for issue in escape_issues {
            self.warnings.push(Diagnostic::warn(
                codes::INVALID_HEX_ESCAPE,
                issue.message,
                Some(span),
            ));
        }
        let text = decode_text(&bytes, self.state.encoding);

        if let Some(pending) = self.state.field.pending_barcode.take() {
            let content = if pending.kind == BarcodeKind::Qr {
                strip_qr_prefix(&text).to_string()
            } else {
                text
            };
            let at = self.placement();
            self.elements.push(Element::Barcode(BarcodeElement {
                at,
                content,
                kind: pending.kind,
                module_width: pending.module_width,
                ratio: pending.ratio,
                height: pending.height,
                orientation: pending.orientation,
                interpretation: pending.interpretation,
                error_correction: pending.error_correction,
                check_digit: pending.check_digit,
                columns: pending.columns,
                rows: pending.rows,
            }));
            return;
        }

        if text.is_empty() {
            return;
        }
        let at = self.placement();
        self.elements.push(Element::Text(TextElement {
            at,
            text,
            font: self.state.font,
            block: self.state.field.block.clone(),
        }));
    }

    fn graphic_field(&mut self, gf: &crate::grammar::command::GraphicField, span: Span) {
        match decode_graphic(&gf.data, gf.format, gf.total_bytes, gf.row_bytes) {
            Ok(bitmap) => {
                let at = self.placement();
                self.elements.push(Element::Image(ImageElement {
                    at,
                    bitmap: Arc::new(bitmap),
                    scale_x: 1,
                    scale_y: 1,
                    orientation: self.state.font.orientation,
                }));
            }
            Err(err) => {
                self.warnings.push(
                    Diagnostic::warn(
                        codes::GRAPHIC_DECODE_FAILED,
                        format!("^GF data failed to decode: {err}"),
                        Some(span),
                    )
                    .with_context(BTreeMap::from([(
                        "rowBytes".to_string(),
                        gf.row_bytes.to_string(),
                    )])),
                );
                // A thin-bordered placeholder of the declared size keeps the
                // failure visible without aborting the render.
                self.placeholder_box(
                    gf.row_bytes.saturating_mul(8),
                    declared_height(gf.total_bytes, gf.row_bytes),
                );
            }
        }
    }

    fn download_graphic(&mut self, dg: &crate::grammar::command::DownloadGraphic, span: Span) {
        match decode_graphic(
            &dg.data,
            GraphicFormat::AsciiHex,
            dg.total_bytes,
            dg.row_bytes,
        ) {
            Ok(bitmap) => self.state.graphics.insert(&dg.name, Arc::new(bitmap)),
            Err(err) => self.warnings.push(Diagnostic::warn(
                codes::GRAPHIC_DECODE_FAILED,
                format!("~DG {} failed to decode: {err}", dg.name),
                Some(span),
            )),
        }
    }

    /// `^XG`/`^IM`: an image referenced before download is a no-op.
    fn recall_graphic(&mut self, name: &str, scale_x: u32, scale_y: u32) {
        let Some(bitmap) = self.state.graphics.get(name) else {
            return;
        };
        let at = self.placement();
        self.elements.push(Element::Image(ImageElement {
            at,
            bitmap,
            scale_x,
            scale_y,
            orientation: self.state.font.orientation,
        }));
    }

    fn placeholder_box(&mut self, width: u32, height: u32) {
        let at = self.placement();
        self.elements.push(Element::Box(BoxElement {
            at,
            width: width.clamp(8, 2000),
            height: height.clamp(8, 2000),
            border: 1,
            color: LineColor::Black,
            rounding: 0,
        }));
    }
}

fn declared_height(total_bytes: u32, row_bytes: u32) -> u32 {
    if row_bytes == 0 {
        0
    } else {
        total_bytes.div_ceil(row_bytes)
    }
}

/// Strip the ZPL `<ecc-override><mode>,` prefix from QR field data.
fn strip_qr_prefix(text: &str) -> &str {
    let b = text.as_bytes();
    if b.len() >= 3
        && matches!(b[0].to_ascii_uppercase(), b'H' | b'Q' | b'M' | b'L')
        && matches!(b[1].to_ascii_uppercase(), b'A' | b'M')
        && b[2] == b','
    {
        &text[3..]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_prefix_stripping() {
        assert_eq!(strip_qr_prefix("QA,https://x"), "https://x");
        assert_eq!(strip_qr_prefix("HM,data"), "data");
        assert_eq!(strip_qr_prefix("plain"), "plain");
        assert_eq!(strip_qr_prefix("QX,keeps"), "QX,keeps");
    }
}
