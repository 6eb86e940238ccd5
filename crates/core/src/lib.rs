//! ZPL preview core library.
//!
//! Interprets ZPL II source: a context-sensitive tokenizer splits the
//! stream into commands, a stateful executor drives a printer-like state
//! machine and emits positioned drawing [`Element`]s, and a validator
//! reports structural problems without executing. Rasterization lives in
//! the companion `zpl-preview` crate.
//!
//! The main entry points are [`parse`] for parsing, [`execute`] for
//! element emission, and [`validate_source`] for validation.

#![warn(missing_docs)]

/// Drawing element model.
pub mod element;
/// Command executor.
pub mod exec;
/// ZPL grammar: tokenizer, command registry, parse product, emitter.
pub mod grammar;
/// Graphic data decoding (`^GF`, `~DG`).
pub mod graphic;
/// Field data decoding (`^FH` hex escapes, `^CI` encodings).
pub mod hex;
/// Modal execution state.
pub mod state;
/// Structural validation.
pub mod validate;

// ── Convenience re-exports ──────────────────────────────────────────────
// Flat imports for the common entry points; the full module paths remain
// available for less common types.

// Tokenizer
pub use grammar::lexer::{Prefix, Token, TokenizeResult, tokenize};

// Parser
pub use grammar::label::{Label, ParseResult, ParsedCommand, parse, to_pretty_json};

// Commands
pub use grammar::command::{BarcodeField, Command, DownloadGraphic, GraphicField};

// Emitter
pub use grammar::emit::emit_zpl;

// Elements
pub use element::{
    BarcodeElement, BarcodeKind, BlockJustification, BoxElement, DiagonalElement, Element,
    EllipseElement, FieldBlock, FontSpec, ImageElement, InterpretationLine, LineColor,
    MonoBitmap, Orientation, OriginMode, Placement, QrEcLevel, ShapeOverride, TextElement,
};

// Executor
pub use exec::{Execution, execute, execute_commands};

// State
pub use state::{BarcodeDefaults, ExecutionState, FieldState, GraphicStore, PendingBarcode};

// Validator
pub use validate::{ValidationResult, validate_source};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, Severity, Span, codes};
