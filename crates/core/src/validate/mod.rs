//! Validation without execution.
//!
//! Reuses the tokenizer and the command registry to report structural
//! problems: missing or unbalanced `^XA`/`^XZ` markers and unsupported
//! command codes. Rendering ignores these findings; only the validator
//! surfaces them.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::grammar::command::is_supported_code;
use crate::grammar::diag::{Diagnostic, Severity, Span, codes};
use crate::grammar::lexer::tokenize;

/// Result of validating a ZPL source string.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// `true` if no errors were found (warnings are allowed).
    pub ok: bool,
    /// All findings, in source order.
    pub issues: Vec<Diagnostic>,
}

impl ValidationResult {
    /// The findings as human-readable strings; empty means valid.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|d| d.to_string()).collect()
    }
}

/// Validate ZPL source.
pub fn validate_source(source: &str) -> ValidationResult {
    let lexed = tokenize(source);
    let mut issues = lexed.diagnostics;

    let mut starts = 0usize;
    let mut ends = 0usize;
    for tok in &lexed.tokens {
        match tok.code.as_str() {
            "XA" => starts += 1,
            "XZ" => ends += 1,
            _ => {}
        }
        if !is_supported_code(&tok.code) {
            issues.push(
                Diagnostic::warn(
                    codes::UNKNOWN_COMMAND,
                    format!("unknown command {}", tok.canonical()),
                    Some(tok.span()),
                )
                .with_context(BTreeMap::from([(
                    "command".to_string(),
                    tok.canonical(),
                )])),
            );
        }
    }

    let end_span = Span::empty(source.len());
    if starts == 0 {
        issues.push(Diagnostic::error(
            codes::MISSING_START,
            "missing label start (^XA)",
            Some(end_span),
        ));
    }
    if ends == 0 {
        issues.push(Diagnostic::error(
            codes::MISSING_TERMINATOR,
            "missing label terminator (^XZ)",
            Some(end_span),
        ));
    }
    if starts != ends && starts > 0 && ends > 0 {
        issues.push(
            Diagnostic::error(
                codes::UNBALANCED_LABEL_MARKERS,
                format!("{starts} ^XA marker(s) but {ends} ^XZ marker(s)"),
                Some(end_span),
            )
            .with_context(BTreeMap::from([
                ("starts".to_string(), starts.to_string()),
                ("ends".to_string(), ends.to_string()),
            ])),
        );
    }

    let ok = !issues
        .iter()
        .any(|d| matches!(d.severity, Severity::Error));
    ValidationResult { ok, issues }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_label_is_valid() {
        let vr = validate_source("^XA^FO10,10^A0N,20,20^FDok^FS^XZ");
        assert!(vr.ok, "unexpected issues: {:?}", vr.issues);
        assert!(vr.messages().is_empty());
    }

    #[test]
    fn missing_markers_are_errors() {
        let vr = validate_source("^FO10,10^FDx^FS");
        assert!(!vr.ok);
        let ids: Vec<_> = vr.issues.iter().map(|d| d.id.as_ref()).collect();
        assert!(ids.contains(&codes::MISSING_START));
        assert!(ids.contains(&codes::MISSING_TERMINATOR));
    }

    #[test]
    fn unbalanced_markers_are_reported() {
        let vr = validate_source("^XA^XZ^XA");
        assert!(!vr.ok);
        assert!(
            vr.issues
                .iter()
                .any(|d| d.id == codes::UNBALANCED_LABEL_MARKERS)
        );
    }

    #[test]
    fn unknown_commands_warn_but_do_not_fail() {
        let vr = validate_source("^XA^QQ1,2^XZ");
        assert!(vr.ok, "warnings only: {:?}", vr.issues);
        assert!(vr.issues.iter().any(|d| d.id == codes::UNKNOWN_COMMAND));
        assert!(vr.messages()[0].contains("^QQ"));
    }
}
