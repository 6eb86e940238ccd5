//! Re-exports from the diagnostics crate so grammar code (and downstream
//! users) can use one import path.

pub use zpl_preview_diagnostics::{Diagnostic, Severity, Span, codes};
