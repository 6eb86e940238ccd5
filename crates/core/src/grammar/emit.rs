//! Canonical ZPL emitter — converts a parsed [`Label`] back to text.
//!
//! Output is one command per line with field data glued to its `^FS`.
//! Optional parameters are written only when present, with empty slots
//! preserved for interior gaps and trailing empties trimmed, so parsing
//! the emitted text reproduces the same command sequence.

use crate::element::InterpretationLine;
use crate::grammar::command::{BarcodeField, Command, GraphicFormat};
use crate::grammar::label::Label;

/// Emit canonical ZPL text for a parsed label.
pub fn emit_zpl(label: &Label) -> String {
    let mut out = String::new();
    let mut glue_next = false;
    for parsed in &label.commands {
        if !out.is_empty() && !glue_next {
            out.push('\n');
        }
        out.push_str(&command_text(&parsed.command));
        glue_next = matches!(
            parsed.command,
            Command::FieldData { .. }
                | Command::SerializationField { .. }
                | Command::FieldVariable { .. }
        );
    }
    out
}

/// Canonical text of a single command.
pub fn command_text(cmd: &Command) -> String {
    match cmd {
        Command::LabelStart => "^XA".into(),
        Command::LabelEnd => "^XZ".into(),
        Command::FieldSeparator => "^FS".into(),
        Command::FieldOrigin { x, y } => format!("^FO{x},{y}"),
        Command::FieldTypeset { x, y } => format!("^FT{x},{y}"),
        Command::LabelHome { x, y } => format!("^LH{x},{y}"),
        Command::LabelShift { shift } => format!("^LS{shift}"),
        Command::LabelTop { top } => format!("^LT{top}"),
        Command::FieldOrientationDefault { orientation } => {
            let mut p = ParamList::new("^FW");
            p.push_opt(orientation.map(|o| o.as_char()));
            p.render()
        }
        Command::PrintWidth { dots } => {
            let mut p = ParamList::new("^PW");
            p.push_opt(*dots);
            p.render()
        }
        Command::LabelLength { dots } => {
            let mut p = ParamList::new("^LL");
            p.push_opt(*dots);
            p.render()
        }
        Command::PrintOrientation { inverted } => {
            format!("^PO{}", if *inverted { 'I' } else { 'N' })
        }
        Command::PrintQuantity { quantity } => format!("^PQ{quantity}"),
        Command::MediaDarkness => "^MD".into(),
        Command::PrintRate => "^PR".into(),
        Command::PrintMode => "^MM".into(),
        Command::FieldBlock(fb) => format!(
            "^FB{},{},{},{},{}",
            fb.width,
            fb.max_lines,
            fb.line_spacing,
            fb.justification.as_char(),
            fb.hanging_indent,
        ),
        Command::FieldReverse => "^FR".into(),
        Command::FieldHex { indicator } => format!("^FH{indicator}"),
        Command::FieldNumber { number } => format!("^FN{number}"),
        Command::FieldData { data } => format!("^FD{data}"),
        Command::SerializationField {
            start,
            increment,
            leading_zeros,
        } => format!("^SN{start},{increment},{}", yn(*leading_zeros)),
        Command::FieldVariable { data } => format!("^FV{data}"),
        Command::FontSelect {
            id,
            orientation,
            height,
            width,
        } => {
            let mut p = ParamList::new(&format!("^A{id}"));
            p.push_opt(orientation.map(|o| o.as_char()));
            p.push_opt(*height);
            p.push_opt(*width);
            p.render()
        }
        Command::ScalableFont {
            orientation,
            height,
            width,
            name,
        } => {
            let mut p = ParamList::new("^A@");
            p.push_opt(orientation.map(|o| o.as_char()));
            p.push_opt(*height);
            p.push_opt(*width);
            p.push_opt(name.clone());
            p.render()
        }
        Command::FontDefault { id, height, width } => {
            let mut p = ParamList::new("^CF");
            p.push_opt(*id);
            p.push_opt(*height);
            p.push_opt(*width);
            p.render()
        }
        Command::ChangeEncoding { id } => format!("^CI{id}"),
        Command::GraphicBox {
            width,
            height,
            border,
            color,
            rounding,
        } => format!("^GB{width},{height},{border},{},{rounding}", color.as_char()),
        Command::GraphicCircle {
            diameter,
            border,
            color,
        } => format!("^GC{diameter},{border},{}", color.as_char()),
        Command::GraphicDiagonal {
            width,
            height,
            border,
            color,
            leaning_right,
        } => format!(
            "^GD{width},{height},{border},{},{}",
            color.as_char(),
            if *leaning_right { 'R' } else { 'L' },
        ),
        Command::GraphicEllipse {
            width,
            height,
            border,
            color,
            shape,
        } => {
            let mut p = ParamList::new("^GE");
            p.push(*width);
            p.push(*height);
            p.push(*border);
            p.push(color.as_char());
            p.push_opt(match shape {
                crate::element::ShapeOverride::None => None,
                crate::element::ShapeOverride::Fill => Some('F'),
                crate::element::ShapeOverride::Stroke => Some('S'),
            });
            p.render()
        }
        Command::GraphicField(gf) => format!(
            "^GF{},{},{},{},{}",
            match gf.format {
                GraphicFormat::AsciiHex => 'A',
                GraphicFormat::Binary => 'B',
                GraphicFormat::CompressedBinary => 'C',
            },
            gf.data_bytes,
            gf.total_bytes,
            gf.row_bytes,
            gf.data,
        ),
        Command::DownloadGraphic(dg) => format!(
            "~DG{},{},{},{}",
            dg.name, dg.total_bytes, dg.row_bytes, dg.data,
        ),
        Command::RecallGraphic {
            name,
            scale_x,
            scale_y,
        } => format!("^XG{name},{scale_x},{scale_y}"),
        Command::ImageMove { name } => format!("^IM{name}"),
        Command::BarcodeDefaults {
            module_width,
            ratio,
            height,
        } => {
            let mut p = ParamList::new("^BY");
            p.push_opt(*module_width);
            p.push_opt(ratio.map(trim_f32));
            p.push_opt(*height);
            p.render()
        }
        Command::Barcode(b) => barcode_text(b),
        Command::Comment { text } => format!("^FX{text}"),
    }
}

fn barcode_text(b: &BarcodeField) -> String {
    use crate::element::BarcodeKind::*;
    let o = b.orientation.map(|o| o.as_char());
    let (f, g) = interpretation_flags(b.interpretation);
    match b.kind {
        Code128 => {
            let mut p = ParamList::new("^BC");
            p.push_opt(o);
            p.push_opt(b.height);
            p.push_opt(f);
            p.push_opt(g);
            p.render()
        }
        Code39 => {
            let mut p = ParamList::new("^B3");
            p.push_opt(o);
            p.push(yn(b.check_digit));
            p.push_opt(b.height);
            p.push_opt(f);
            p.push_opt(g);
            p.render()
        }
        Ean13 => {
            let mut p = ParamList::new("^BE");
            p.push_opt(o);
            p.push_opt(b.height);
            p.push_opt(f);
            p.push_opt(g);
            p.render()
        }
        Code93 => {
            let mut p = ParamList::new("^BA");
            p.push_opt(o);
            p.push_opt(b.height);
            p.push_opt(f);
            p.push_opt(g);
            p.render()
        }
        UpcA => {
            let mut p = ParamList::new("^BU");
            p.push_opt(o);
            p.push_opt(b.height);
            p.push_opt(f);
            p.push_opt(g);
            p.render()
        }
        Interleaved2of5 => {
            let mut p = ParamList::new("^B2");
            p.push_opt(o);
            p.push_opt(b.height);
            p.push_opt(f);
            p.push_opt(g);
            p.push(yn(b.check_digit));
            p.render()
        }
        Codabar => {
            let mut p = ParamList::new("^BK");
            p.push_opt(o);
            p.push(yn(b.check_digit));
            p.push_opt(b.height);
            p.push_opt(f);
            p.push_opt(g);
            p.render()
        }
        Qr => {
            let mut p = ParamList::new("^BQ");
            p.push_opt(o);
            p.push(2u32);
            p.push_opt(b.magnification);
            p.push_opt(b.error_correction.map(|e| match e {
                crate::element::QrEcLevel::Low => 'L',
                crate::element::QrEcLevel::Medium => 'M',
                crate::element::QrEcLevel::Quartile => 'Q',
                crate::element::QrEcLevel::High => 'H',
            }));
            p.render()
        }
        DataMatrix => {
            let mut p = ParamList::new("^BX");
            p.push_opt(o);
            p.push_opt(b.magnification);
            p.push_opt(None::<u32>);
            p.push_opt(b.columns);
            p.push_opt(b.rows);
            p.render()
        }
        Pdf417 => {
            let mut p = ParamList::new("^B7");
            p.push_opt(o);
            p.push_opt(b.height);
            p.push_opt(None::<u32>);
            p.push_opt(b.columns);
            p.push_opt(b.rows);
            p.render()
        }
        Aztec => {
            let mut p = ParamList::new("^B0");
            p.push_opt(o);
            p.push_opt(b.magnification);
            p.render()
        }
        MaxiCode => "^BD".into(),
    }
}

fn interpretation_flags(i: Option<InterpretationLine>) -> (Option<char>, Option<char>) {
    match i {
        None => (None, None),
        Some(InterpretationLine::Off) => (Some('N'), Some('N')),
        Some(InterpretationLine::Below) => (Some('Y'), Some('N')),
        Some(InterpretationLine::Above) => (Some('Y'), Some('Y')),
    }
}

fn yn(flag: bool) -> char {
    if flag { 'Y' } else { 'N' }
}

/// Format an `f32` without trailing zeros (`2.0` → `"2"`, `2.50` → `"2.5"`).
fn trim_f32(n: f32) -> String {
    let s = format!("{:.4}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() { "0".into() } else { s.into() }
}

// ── Parameter list builder ───────────────────────────────────────────────

/// Builds a comma-joined parameter list, preserving interior empty slots
/// and trimming trailing ones.
struct ParamList {
    head: String,
    parts: Vec<Option<String>>,
}

impl ParamList {
    fn new(head: &str) -> Self {
        Self {
            head: head.to_string(),
            parts: Vec::new(),
        }
    }

    fn push(&mut self, v: impl ToString) {
        self.parts.push(Some(v.to_string()));
    }

    fn push_opt(&mut self, v: Option<impl ToString>) {
        self.parts.push(v.map(|x| x.to_string()));
    }

    fn render(self) -> String {
        let mut out = self.head;
        let Some(last) = self.parts.iter().rposition(Option::is_some) else {
            return out;
        };
        for (i, part) in self.parts[..=last].iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if let Some(p) = part {
                out.push_str(p);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Orientation;

    #[test]
    fn param_list_trims_trailing_empties() {
        let mut p = ParamList::new("^BC");
        p.push_opt(Some('N'));
        p.push_opt(None::<u32>);
        p.push_opt(None::<char>);
        assert_eq!(p.render(), "^BCN");
    }

    #[test]
    fn param_list_preserves_interior_gaps() {
        let mut p = ParamList::new("^BQ");
        p.push_opt(None::<char>);
        p.push(2u32);
        p.push_opt(None::<u32>);
        p.push_opt(Some('M'));
        assert_eq!(p.render(), "^BQ,2,,M");
    }

    #[test]
    fn font_select_with_all_params() {
        let cmd = Command::FontSelect {
            id: '0',
            orientation: Some(Orientation::Normal),
            height: Some(30),
            width: Some(20),
        };
        assert_eq!(command_text(&cmd), "^A0N,30,20");
    }

    #[test]
    fn trim_f32_drops_trailing_zeros() {
        assert_eq!(trim_f32(2.0), "2");
        assert_eq!(trim_f32(2.5), "2.5");
        assert_eq!(trim_f32(3.0), "3");
    }
}
