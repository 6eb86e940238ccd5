//! Diagnostics for the ZPL preview renderer.
//!
//! Provides the [`Diagnostic`], [`Severity`], and [`Span`] types used by
//! the tokenizer, executor, and validator to report problems without
//! aborting a render. Diagnostic codes live in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants and their explanations.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

// ── Severity / Span ──────────────────────────────────────────────────────

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hard error — the input is invalid.
    Error,
    /// Warning — the input may render differently than intended.
    Warn,
    /// Informational note.
    Info,
}

/// Byte span `[start, end)` in the source input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`. Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }
}

// ── Diagnostic ───────────────────────────────────────────────────────────

/// A diagnostic message produced by the tokenizer, executor, or validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code (e.g., `"ZPV0201"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Byte span in the source input this diagnostic relates to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling; `BTreeMap` keeps serialized
    /// key order deterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns the long-form explanation for this diagnostic's code, if any.
    pub fn explain(&self) -> Option<&'static str> {
        codes::explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_constructors() {
        let s = Span::new(5, 10);
        assert_eq!((s.start, s.end), (5, 10));
        let e = Span::empty(7);
        assert_eq!((e.start, e.end), (7, 7));
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_inverted_panics() {
        Span::new(5, 3);
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::warn(codes::UNKNOWN_COMMAND, "unknown command ^QQ", None);
        assert_eq!(format!("{}", d), "warn[ZPV0201]: unknown command ^QQ");
    }

    #[test]
    fn diagnostic_serde_omits_none_fields() {
        let d = Diagnostic::error(codes::MISSING_START, "no ^XA", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "None span should be omitted: {json}");
        assert!(!json.contains("context"), "None context omitted: {json}");
    }

    #[test]
    fn diagnostic_context_roundtrip() {
        let d = Diagnostic::warn(codes::PARAM_OUT_OF_RANGE, "^BY.w clamped", Some(Span::new(2, 9)))
            .with_context(BTreeMap::from([
                ("command".into(), "^BY".into()),
                ("min".into(), "1".into()),
                ("max".into(), "10".into()),
            ]));
        let json = serde_json::to_string(&d).unwrap();
        let d2: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, d2);
    }

    #[test]
    fn all_codes_have_explanations() {
        let all = [
            codes::STRAY_PREFIX,
            codes::UNTERMINATED_FIELD_DATA,
            codes::UNTERMINATED_FORMAT_DOWNLOAD,
            codes::TRUNCATED_GRAPHIC_DATA,
            codes::UNKNOWN_COMMAND,
            codes::PARAM_OUT_OF_RANGE,
            codes::PARAM_INVALID,
            codes::MISSING_START,
            codes::MISSING_TERMINATOR,
            codes::UNBALANCED_LABEL_MARKERS,
            codes::INVALID_HEX_ESCAPE,
            codes::GRAPHIC_DECODE_FAILED,
        ];
        for code in &all {
            assert!(
                codes::explain(code).is_some(),
                "diagnostic code {code} has no explain() entry"
            );
        }
        assert!(codes::explain("NOPE").is_none());
    }
}
