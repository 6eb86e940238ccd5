//! ZPL tokenizer — splits raw input into `{prefix, code, payload}` tokens.
//!
//! The tokenizer is context sensitive: most payloads run up to (but not
//! including) the next `^`/`~` prefix, but a handful of commands own their
//! terminator instead. `^FD`/`^SN`/`^FV` run to a literal `^FS`, `^DF` runs
//! through its terminating `^XZ`, `^FX` runs to the next `^`, and the
//! graphic-data commands (`^GF`, `~DG`) bound their data by the byte count
//! declared in their own header. This is the only way field data may legally
//! contain prefix characters.
//!
//! Command codes are not validated here; unknown codes still produce tokens
//! and are skipped (or warned about) downstream.

use crate::grammar::diag::{Diagnostic, Span, codes};

/// The command leader character a token was introduced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// Format command prefix (`^`).
    Caret,
    /// Control command prefix (`~`).
    Tilde,
}

impl Prefix {
    /// The literal leader character.
    pub fn as_char(self) -> char {
        match self {
            Prefix::Caret => '^',
            Prefix::Tilde => '~',
        }
    }
}

/// A single tokenized command: prefix, code, and raw payload.
///
/// `payload` and `raw` borrow directly from the source input. `raw` is
/// exactly `&input[start..end]` and covers the prefix, code, and payload,
/// so concatenating `raw` over all tokens reproduces every command in
/// source order (garbage between commands is skipped).
#[derive(Debug, Clone)]
pub struct Token<'a> {
    /// The leader character that introduced the command.
    pub prefix: Prefix,
    /// Uppercased command code (1–2 characters). For the font-select
    /// command the font identifier is part of the code (`A0`, `AB`, `A@`).
    pub code: String,
    /// Raw payload text, up to this command's terminator.
    pub payload: &'a str,
    /// The full source slice of this token (prefix through payload).
    pub raw: &'a str,
    /// Byte offset of the prefix character.
    pub start: usize,
    /// Byte offset one past the payload.
    pub end: usize,
}

impl Token<'_> {
    /// The canonical `^`-prefixed form of the code (e.g. `"^FO"`, `"~DG"`).
    pub fn canonical(&self) -> String {
        format!("{}{}", self.prefix.as_char(), self.code)
    }

    /// Source span of the whole token.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Result of tokenizing a ZPL input string.
pub struct TokenizeResult<'a> {
    /// Tokens in source order.
    pub tokens: Vec<Token<'a>>,
    /// Warnings produced while tokenizing (never fatal).
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenize ZPL input.
///
/// Never fails: malformed constructs fall back to the generic payload rule
/// and are reported through [`TokenizeResult::diagnostics`].
pub fn tokenize(input: &str) -> TokenizeResult<'_> {
    Scanner::new(input).run()
}

// ── Scanner ──────────────────────────────────────────────────────────────

/// Byte-walking scanner.
///
/// All delimiter tests compare against ASCII values (0x00–0x7F). UTF-8
/// continuation bytes are in 0x80–0xBF and never match, so indexing bytes
/// and casting `b as char` is safe without full UTF-8 decoding; slice
/// boundaries are snapped to char boundaries where counts are involved.
struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token<'a>>,
    diags: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            diags: Vec::new(),
        }
    }

    fn run(mut self) -> TokenizeResult<'a> {
        while let Some(start) = self.next_prefix(self.pos) {
            self.pos = start;
            self.scan_command();
        }
        TokenizeResult {
            tokens: self.tokens,
            diagnostics: self.diags,
        }
    }

    /// Byte offset of the next `^` or `~` at or after `from`.
    fn next_prefix(&self, from: usize) -> Option<usize> {
        self.bytes[from.min(self.bytes.len())..]
            .iter()
            .position(|&b| b == b'^' || b == b'~')
            .map(|i| from + i)
    }

    /// Scan one command starting at the prefix under `self.pos`.
    fn scan_command(&mut self) {
        let start = self.pos;
        let prefix = if self.bytes[start] == b'^' {
            Prefix::Caret
        } else {
            Prefix::Tilde
        };

        let c1 = self.bytes.get(start + 1).copied();
        let Some(c1) = c1.filter(|b| b.is_ascii_alphanumeric()) else {
            // Stray prefix with no command code; skip just the prefix so a
            // following prefix is still picked up.
            self.diags.push(Diagnostic::warn(
                codes::STRAY_PREFIX,
                "command prefix not followed by a command code",
                Some(Span::new(start, start + 1)),
            ));
            self.pos = start + 1;
            return;
        };

        // Code extraction: one alphanumeric, plus a second alphanumeric when
        // present. After `A` (font select) the next character is the font
        // identifier and `@` is also accepted (`^A@` scalable font).
        let c2 = self.bytes.get(start + 2).copied();
        let code_len = match c2 {
            Some(b) if c1.eq_ignore_ascii_case(&b'A') && (b.is_ascii_alphanumeric() || b == b'@') => 2,
            Some(b) if b.is_ascii_alphanumeric() => 2,
            _ => 1,
        };
        let code: String = self.input[start + 1..start + 1 + code_len].to_ascii_uppercase();

        let payload_start = start + 1 + code_len;
        let end = self.payload_end(&code, payload_start);
        let payload = &self.input[payload_start..end];

        self.tokens.push(Token {
            prefix,
            code,
            payload,
            raw: &self.input[start..end],
            start,
            end,
        });
        self.pos = end;
    }

    /// End offset of the payload starting at `from` for the given code.
    fn payload_end(&mut self, code: &str, from: usize) -> usize {
        match code {
            "FD" | "SN" | "FV" => self.field_data_end(from),
            "DF" => self.format_download_end(from),
            "FX" => self.comment_end(from),
            "GF" => self.graphic_payload_end(from, 4, 1, 2),
            "DG" => self.graphic_payload_end(from, 3, 1, 1),
            _ => self.generic_end(from),
        }
    }

    /// Generic rule: payload runs to the next prefix character.
    fn generic_end(&self, from: usize) -> usize {
        self.next_prefix(from).unwrap_or(self.input.len())
    }

    /// `^FD`/`^SN`/`^FV`: payload runs to the next literal `^FS`
    /// (case-insensitive). The `^FS` itself is left for the next token.
    fn field_data_end(&mut self, from: usize) -> usize {
        let mut i = from;
        while let Some(p) = self.next_prefix(i) {
            if self.bytes[p] == b'^'
                && self.bytes.get(p + 1).is_some_and(|b| b.eq_ignore_ascii_case(&b'F'))
                && self.bytes.get(p + 2).is_some_and(|b| b.eq_ignore_ascii_case(&b'S'))
            {
                return p;
            }
            i = p + 1;
        }
        // Truncated field data: fall back to the generic rule.
        self.diags.push(Diagnostic::warn(
            codes::UNTERMINATED_FIELD_DATA,
            "field data not terminated by ^FS",
            Some(Span::new(from, self.input.len())),
        ));
        self.generic_end(from)
    }

    /// `^DF`: payload runs through the terminating `^XZ`, inclusive.
    fn format_download_end(&mut self, from: usize) -> usize {
        let mut i = from;
        while let Some(p) = self.next_prefix(i) {
            if self.bytes[p] == b'^'
                && self.bytes.get(p + 1).is_some_and(|b| b.eq_ignore_ascii_case(&b'X'))
                && self.bytes.get(p + 2).is_some_and(|b| b.eq_ignore_ascii_case(&b'Z'))
            {
                return p + 3;
            }
            i = p + 1;
        }
        self.diags.push(Diagnostic::warn(
            codes::UNTERMINATED_FORMAT_DOWNLOAD,
            "^DF stored format not terminated by ^XZ",
            Some(Span::new(from, self.input.len())),
        ));
        self.input.len()
    }

    /// `^FX`: comment runs to the next `^` (any command).
    fn comment_end(&self, from: usize) -> usize {
        self.bytes[from..]
            .iter()
            .position(|&b| b == b'^')
            .map_or(self.input.len(), |i| from + i)
    }

    /// `^GF` / `~DG`: parse the header parameters through `comma_count`
    /// commas; the parameter at `count_index` (`alt_index` as fallback)
    /// declares the total data byte count `t`. ASCII-hex data then spans
    /// `2·t` hex digits, binary data `t` raw bytes. Compressed ASCII data
    /// (run-length codes or `:Z64:`) has no fixed length and falls back to
    /// scanning for the next prefix, which is safe because compressed data
    /// never contains prefix characters.
    fn graphic_payload_end(
        &mut self,
        from: usize,
        comma_count: usize,
        count_index: usize,
        alt_index: usize,
    ) -> usize {
        let mut params: Vec<&str> = Vec::with_capacity(comma_count);
        let mut i = from;
        let mut part_start = from;
        while params.len() < comma_count {
            match self.bytes.get(i) {
                Some(b',') => {
                    params.push(&self.input[part_start..i]);
                    i += 1;
                    part_start = i;
                }
                Some(b'^') | Some(b'~') | None => {
                    // Header cut short; treat the whole thing generically.
                    return self.generic_end(from);
                }
                _ => i += 1,
            }
        }

        let count = |idx: usize| -> Option<u64> { params.get(idx)?.trim().parse().ok() };
        let total = count(count_index).or_else(|| count(alt_index)).unwrap_or(0);

        // Compression indicator: first parameter of ^GF ('A' ASCII hex,
        // 'B' raw binary, 'C' compressed binary). ~DG data is always ASCII.
        let ascii = comma_count == 3
            || params
                .first()
                .map(|p| !matches!(p.trim().as_bytes().first(), Some(b'B' | b'b' | b'C' | b'c')))
                .unwrap_or(true);

        let data_start = i;
        if !ascii {
            // Binary data: exactly `t` bytes, snapped to a char boundary and
            // clamped to the input length.
            let mut end = (data_start + total as usize).min(self.input.len());
            while end < self.input.len() && !self.input.is_char_boundary(end) {
                end += 1;
            }
            if data_start + total as usize > self.input.len() {
                self.diags.push(Diagnostic::warn(
                    codes::TRUNCATED_GRAPHIC_DATA,
                    format!("graphic data declares {total} bytes but input ends early"),
                    Some(Span::new(data_start, self.input.len())),
                ));
            }
            return end;
        }

        // ASCII data: count hex digits toward 2·t, skipping whitespace. Any
        // run-length compression character or a Z64 envelope means the digit
        // count no longer bounds the data, so scan to the next prefix.
        let rest = &self.bytes[data_start..];
        if rest.trim_ascii_start().starts_with(b":Z64") || rest.trim_ascii_start().starts_with(b":B64") {
            return self.generic_end(data_start);
        }
        let needed = total.saturating_mul(2);
        let mut digits: u64 = 0;
        let mut j = data_start;
        while j < self.bytes.len() && digits < needed {
            let b = self.bytes[j];
            if b == b'^' || b == b'~' {
                self.diags.push(Diagnostic::warn(
                    codes::TRUNCATED_GRAPHIC_DATA,
                    format!(
                        "graphic data declares {total} bytes but only {} hex digits were found",
                        digits
                    ),
                    Some(Span::new(data_start, j)),
                ));
                return j;
            }
            if b.is_ascii_hexdigit() {
                digits += 1;
            } else if !b.is_ascii_whitespace() {
                // Run-length compression code; length bookkeeping is off.
                return self.generic_end(j);
            }
            j += 1;
        }
        if digits < needed {
            self.diags.push(Diagnostic::warn(
                codes::TRUNCATED_GRAPHIC_DATA,
                format!("graphic data declares {total} bytes but input ends early"),
                Some(Span::new(data_start, self.input.len())),
            ));
        }
        j
    }
}
