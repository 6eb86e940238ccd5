//! The parse product: an ordered command sequence plus label attributes.

use serde::{Deserialize, Serialize};

use crate::grammar::args::{ParamIssue, ParamIssueKind};
use crate::grammar::command::{self, Command};
use crate::grammar::diag::{Diagnostic, Span, codes};
use crate::grammar::lexer::{Token, tokenize};

/// A command with its source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// The typed command.
    pub command: Command,
    /// Source span of the whole command (prefix through payload).
    pub span: Span,
}

/// The parse product: every recognized command in source order, plus the
/// label-level attributes set by those commands.
///
/// Construction is complete when `^XZ` is seen or input ends; streams with
/// several `^XA…^XZ` frames parse into one `Label` whose executor resets
/// per-label state at each `^XA`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Recognized commands in source order.
    pub commands: Vec<ParsedCommand>,
    /// Print width in dots from the last `^PW`.
    pub print_width: Option<u32>,
    /// Label length in dots from the last `^LL`.
    pub print_length: Option<u32>,
    /// Home X in dots from the last `^LH`.
    pub home_x: i32,
    /// Home Y in dots from the last `^LH`.
    pub home_y: i32,
}

/// Result of parsing a ZPL input string.
#[derive(Debug, Serialize)]
pub struct ParseResult {
    /// The parsed label.
    pub label: Label,
    /// Diagnostics (warnings only) produced while tokenizing and parsing.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse ZPL source into a [`Label`].
///
/// Never fails: unknown commands are skipped with a warning, malformed
/// parameters fall back to their documented defaults.
pub fn parse(source: &str) -> ParseResult {
    let lexed = tokenize(source);
    let mut diagnostics = lexed.diagnostics;
    let mut label = Label::default();

    for tok in &lexed.tokens {
        let Some((cmd, issues)) = command::parse_token(tok) else {
            diagnostics.push(
                Diagnostic::warn(
                    codes::UNKNOWN_COMMAND,
                    format!("unknown command {}", tok.canonical()),
                    Some(tok.span()),
                )
                .with_context(std::collections::BTreeMap::from([(
                    "command".to_string(),
                    tok.canonical(),
                )])),
            );
            continue;
        };
        push_param_diags(&mut diagnostics, tok, &issues);

        match &cmd {
            Command::PrintWidth { dots: Some(w) } => label.print_width = Some(*w),
            Command::LabelLength { dots: Some(l) } => label.print_length = Some(*l),
            Command::LabelHome { x, y } => {
                label.home_x = *x;
                label.home_y = *y;
            }
            _ => {}
        }
        label.commands.push(ParsedCommand {
            command: cmd,
            span: tok.span(),
        });
    }

    ParseResult { label, diagnostics }
}

fn push_param_diags(diags: &mut Vec<Diagnostic>, tok: &Token<'_>, issues: &[ParamIssue]) {
    for issue in issues {
        let (code, message) = match &issue.kind {
            ParamIssueKind::Invalid => (
                codes::PARAM_INVALID,
                format!(
                    "{} parameter {} ({:?}) is not a valid number; using the default",
                    tok.canonical(),
                    issue.index + 1,
                    issue.raw,
                ),
            ),
            ParamIssueKind::OutOfRange { min, max } => (
                codes::PARAM_OUT_OF_RANGE,
                format!(
                    "{} parameter {} ({}) outside [{}, {}]; clamped",
                    tok.canonical(),
                    issue.index + 1,
                    issue.raw,
                    min,
                    max,
                ),
            ),
        };
        diags.push(Diagnostic::warn(code, message, Some(tok.span())));
    }
}

/// Serialize a value to pretty-printed JSON (debugging helper).
pub fn to_pretty_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
