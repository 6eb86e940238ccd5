//! Field data decoding: `^FH` hex escapes and `^CI` text encodings.
//!
//! With `^FH` active, `<indicator>HH` sequences in field data stand for
//! literal byte values (indicator defaults to `_`). The decoded byte
//! stream is then interpreted in the encoding selected by `^CI`;
//! id 28 is UTF-8, everything else decodes pragmatically as UTF-8 with a
//! Latin-1 fallback for invalid sequences.

/// Byte offset and description of a malformed escape sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeIssue {
    /// Byte offset of the indicator character within the field data.
    pub offset: usize,
    /// What was wrong.
    pub message: String,
}

/// Decode field data into bytes, applying hex escapes when `indicator`
/// is set.
///
/// Malformed escapes keep their raw characters and are reported; decoding
/// always produces output.
pub fn decode_field_bytes(content: &str, indicator: Option<char>) -> (Vec<u8>, Vec<EscapeIssue>) {
    let Some(ind) = indicator.filter(char::is_ascii) else {
        return (content.as_bytes().to_vec(), Vec::new());
    };
    let ind = ind as u8;

    let bytes = content.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut issues = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != ind {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(&h1), Some(&h2)) if h1.is_ascii_hexdigit() && h2.is_ascii_hexdigit() => {
                out.push(hex_value(h1) << 4 | hex_value(h2));
                i += 3;
            }
            _ => {
                issues.push(EscapeIssue {
                    offset: i,
                    message: format!(
                        "expected two hex digits after '{}' at offset {}",
                        ind as char, i,
                    ),
                });
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    (out, issues)
}

/// Interpret decoded field bytes as text in the given `^CI` encoding.
pub fn decode_text(bytes: &[u8], encoding_id: u32) -> String {
    match encoding_id {
        // UTF-8; invalid sequences are replaced rather than dropped.
        28 => String::from_utf8_lossy(bytes).into_owned(),
        // Legacy single-byte pages map pragmatically: valid UTF-8 passes
        // through, anything else is treated as Latin-1.
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        },
    }
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'A'..=b'F' => b - b'A' + 10,
        b'a'..=b'f' => b - b'a' + 10,
        _ => unreachable!("checked hex digit"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_indicator() {
        let (bytes, issues) = decode_field_bytes("Hello_20World", None);
        assert_eq!(bytes, b"Hello_20World");
        assert!(issues.is_empty());
    }

    #[test]
    fn decodes_escapes() {
        let (bytes, issues) = decode_field_bytes("Price:_20_2410.00", Some('_'));
        assert_eq!(bytes, b"Price: $10.00");
        assert!(issues.is_empty());
    }

    #[test]
    fn custom_indicator() {
        let (bytes, _) = decode_field_bytes("#41#42#43", Some('#'));
        assert_eq!(bytes, b"ABC");
        // '_' is plain text under a '#' indicator.
        let (bytes, issues) = decode_field_bytes("_41", Some('#'));
        assert_eq!(bytes, b"_41");
        assert!(issues.is_empty());
    }

    #[test]
    fn malformed_escape_keeps_raw_and_reports() {
        let (bytes, issues) = decode_field_bytes("_GG_4", Some('_'));
        assert_eq!(bytes, b"_GG_4");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].offset, 0);
        assert_eq!(issues[1].offset, 3);
    }

    #[test]
    fn hex_case_is_insensitive() {
        let (upper, _) = decode_field_bytes("_4A", Some('_'));
        let (lower, _) = decode_field_bytes("_4a", Some('_'));
        assert_eq!(upper, lower);
        assert_eq!(upper, b"J");
    }

    #[test]
    fn utf8_escapes_produce_unicode_text() {
        let (bytes, _) = decode_field_bytes("_C3_A9", Some('_'));
        assert_eq!(decode_text(&bytes, 28), "é");
    }

    #[test]
    fn legacy_encoding_falls_back_to_latin1() {
        assert_eq!(decode_text(&[0xE9], 0), "é");
        assert_eq!(decode_text("plain".as_bytes(), 0), "plain");
    }
}
