//! The modal printer state machine driven by the command executor.
//!
//! State is created at pipeline start, partially reset on `^XA`, and
//! destroyed after rasterization. Per-field state is cleared on `^FS`;
//! the graphics cache outlives individual labels.

use std::collections::HashMap;
use std::sync::Arc;

use crate::element::{
    BarcodeKind, FieldBlock, FontSpec, InterpretationLine, MonoBitmap, Orientation, OriginMode,
    QrEcLevel,
};

/// Barcode field defaults set by `^BY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarcodeDefaults {
    /// Narrow module width in dots (1–10).
    pub module_width: u32,
    /// Wide-to-narrow ratio (2.0–3.0).
    pub ratio: f32,
    /// Default bar height in dots.
    pub height: u32,
}

impl Default for BarcodeDefaults {
    fn default() -> Self {
        Self {
            module_width: 2,
            ratio: 3.0,
            height: 10,
        }
    }
}

/// A fully resolved barcode descriptor staged between a `^B…` command and
/// the `^FD` that supplies its data. `^FS` discards it unconsumed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBarcode {
    /// Symbology.
    pub kind: BarcodeKind,
    /// Field rotation.
    pub orientation: Orientation,
    /// Narrow module width in dots, from `^BY` or a magnification override.
    pub module_width: u32,
    /// Wide-to-narrow ratio from `^BY`.
    pub ratio: f32,
    /// Bar height in dots.
    pub height: u32,
    /// Interpretation line placement.
    pub interpretation: InterpretationLine,
    /// QR error correction level.
    pub error_correction: Option<QrEcLevel>,
    /// Append a check digit.
    pub check_digit: bool,
    /// Requested data columns (PDF417).
    pub columns: Option<u32>,
    /// Requested rows (PDF417).
    pub rows: Option<u32>,
}

/// Per-field state, cleared by `^FS` and by the positioning commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    /// Reverse print (`^FR`).
    pub reverse: bool,
    /// Hex escape indicator (`^FH`), when active.
    pub hex_indicator: Option<char>,
    /// Field block (`^FB`) for the next text field.
    pub block: Option<FieldBlock>,
    /// Staged barcode awaiting `^FD`.
    pub pending_barcode: Option<PendingBarcode>,
}

/// Case-insensitive graphic cache keyed by storage name.
///
/// Names are stored both fully (`R:LOGO.GRF`) and with the drive prefix
/// stripped (`LOGO.GRF`), so recalls may include or omit the drive.
#[derive(Debug, Clone, Default)]
pub struct GraphicStore {
    map: HashMap<String, Arc<MonoBitmap>>,
}

impl GraphicStore {
    /// Store a bitmap under `name`.
    pub fn insert(&mut self, name: &str, bitmap: Arc<MonoBitmap>) {
        let key = name.trim().to_ascii_uppercase();
        if let Some(stripped) = strip_drive(&key) {
            self.map.insert(stripped.to_string(), Arc::clone(&bitmap));
        }
        self.map.insert(key, bitmap);
    }

    /// Look up `name`, trying the exact key first, then the portion after
    /// the drive prefix. Returns `None` when nothing was downloaded.
    pub fn get(&self, name: &str) -> Option<Arc<MonoBitmap>> {
        let key = name.trim().to_ascii_uppercase();
        if let Some(hit) = self.map.get(&key) {
            return Some(Arc::clone(hit));
        }
        strip_drive(&key)
            .and_then(|stripped| self.map.get(stripped))
            .cloned()
    }

    /// Number of distinct stored names (both key forms counted once).
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` when nothing has been downloaded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The portion of a storage name after its `<drive>:` prefix, if any.
fn strip_drive(name: &str) -> Option<&str> {
    let (drive, rest) = name.split_once(':')?;
    // A single-letter prefix is a drive; anything else is part of the name.
    (drive.len() == 1 && !rest.is_empty()).then_some(rest)
}

/// The modal execution state.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    /// Current field X in dots (relative to home + shift).
    pub x: i32,
    /// Current field Y in dots (relative to home + top).
    pub y: i32,
    /// How the next field's anchor is interpreted (`^FO`/`^FT`).
    pub origin: OriginMode,
    /// Label home X (`^LH`).
    pub home_x: i32,
    /// Label home Y (`^LH`).
    pub home_y: i32,
    /// Horizontal shift (`^LS`).
    pub shift_x: i32,
    /// Vertical top offset (`^LT`).
    pub top_y: i32,
    /// Current font (id, size, orientation).
    pub font: FontSpec,
    /// Text encoding id (`^CI`; 28 = UTF-8).
    pub encoding: u32,
    /// Whole-label 180° rotation (`^PO`).
    pub inverted: bool,
    /// Print width in dots (`^PW`).
    pub print_width: Option<u32>,
    /// Label length in dots (`^LL`).
    pub label_length: Option<u32>,
    /// Requested label count (`^PQ`, metadata).
    pub quantity: u32,
    /// Per-field state.
    pub field: FieldState,
    /// Barcode defaults (`^BY`).
    pub barcode: BarcodeDefaults,
    /// Downloaded graphics, shared across labels in one stream.
    pub graphics: GraphicStore,
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionState {
    /// Fresh state with documented defaults.
    pub fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            origin: OriginMode::TopLeft,
            home_x: 0,
            home_y: 0,
            shift_x: 0,
            top_y: 0,
            font: default_font(),
            encoding: 0,
            inverted: false,
            print_width: None,
            label_length: None,
            quantity: 1,
            field: FieldState::default(),
            barcode: BarcodeDefaults::default(),
            graphics: GraphicStore::default(),
        }
    }

    /// `^XA`: reset per-label state. Position and field state clear and
    /// orientations return to normal; label offsets, fonts sizes, barcode
    /// defaults, encoding, and the graphics cache persist.
    pub fn reset_label(&mut self) {
        self.x = 0;
        self.y = 0;
        self.origin = OriginMode::TopLeft;
        self.font.orientation = Orientation::Normal;
        self.inverted = false;
        self.field = FieldState::default();
    }

    /// `^FS`: reset per-field state, discarding any staged barcode.
    pub fn clear_field(&mut self) {
        self.field = FieldState::default();
    }

    /// Absolute anchor of the next field: label home plus shift/top plus
    /// the current position.
    pub fn anchor(&self) -> (i32, i32) {
        (
            self.home_x + self.shift_x + self.x,
            self.home_y + self.top_y + self.y,
        )
    }
}

/// Font in effect before any `^A`/`^CF`.
fn default_font() -> FontSpec {
    FontSpec {
        id: 'A',
        height: 10,
        width: 0,
        orientation: Orientation::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_combines_home_shift_and_position() {
        let mut st = ExecutionState::new();
        st.home_x = 10;
        st.home_y = 20;
        st.shift_x = 5;
        st.top_y = 7;
        st.x = 100;
        st.y = 200;
        assert_eq!(st.anchor(), (115, 227));
    }

    #[test]
    fn reset_label_clears_position_but_keeps_cache_and_offsets() {
        let mut st = ExecutionState::new();
        st.x = 9;
        st.y = 9;
        st.home_x = 30;
        st.field.reverse = true;
        st.graphics
            .insert("R:X.GRF", Arc::new(MonoBitmap::new(8, 1)));
        st.reset_label();
        assert_eq!((st.x, st.y), (0, 0));
        assert!(!st.field.reverse);
        assert_eq!(st.home_x, 30);
        assert!(st.graphics.get("X.GRF").is_some());
    }

    #[test]
    fn graphic_store_is_case_insensitive_and_drive_optional() {
        let mut store = GraphicStore::default();
        store.insert("R:Dot.GRF", Arc::new(MonoBitmap::new(8, 1)));
        assert!(store.get("r:dot.grf").is_some());
        assert!(store.get("DOT.GRF").is_some());
        store.insert("PLAIN.GRF", Arc::new(MonoBitmap::new(8, 1)));
        assert!(store.get("E:PLAIN.GRF").is_some());
        assert!(store.get("MISSING.GRF").is_none());
    }
}
