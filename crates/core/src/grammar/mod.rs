/// Positional parameter parsing helpers.
pub mod args;
/// Command registry — token codes to typed commands.
pub mod command;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// Canonical ZPL emitter — converts a parsed label back to text.
pub mod emit;
/// The parse product: command sequence plus label attributes.
pub mod label;
/// ZPL tokenizer — raw input to `{prefix, code, payload}` tokens.
pub mod lexer;
