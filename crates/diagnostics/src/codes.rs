//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. Ids are grouped by hundred: 01xx tokenizer,
//! 02xx registry/executor, 03xx label structure, 04xx graphics data.

/// Command prefix not followed by an alphanumeric code character.
pub const STRAY_PREFIX: &str = "ZPV0101";
/// `^FD`/`^SN`/`^FV` payload ran to end of input without `^FS`.
pub const UNTERMINATED_FIELD_DATA: &str = "ZPV0102";
/// `^DF` payload ran to end of input without `^XZ`.
pub const UNTERMINATED_FORMAT_DOWNLOAD: &str = "ZPV0103";
/// Graphic data payload shorter than its declared byte count.
pub const TRUNCATED_GRAPHIC_DATA: &str = "ZPV0104";

/// Command code is not in the supported set.
pub const UNKNOWN_COMMAND: &str = "ZPV0201";
/// Numeric parameter outside its documented range (clamped).
pub const PARAM_OUT_OF_RANGE: &str = "ZPV0202";
/// Parameter failed to parse; the documented default was used.
pub const PARAM_INVALID: &str = "ZPV0203";

/// No `^XA` in the input.
pub const MISSING_START: &str = "ZPV0301";
/// No `^XZ` in the input.
pub const MISSING_TERMINATOR: &str = "ZPV0302";
/// `^XA` and `^XZ` counts differ.
pub const UNBALANCED_LABEL_MARKERS: &str = "ZPV0303";

/// Hex escape sequence in field data is malformed.
pub const INVALID_HEX_ESCAPE: &str = "ZPV0401";
/// Graphic payload failed to decode (bad hex, bad Z64).
pub const GRAPHIC_DECODE_FAILED: &str = "ZPV0402";

/// Returns the long-form explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    Some(match id {
        STRAY_PREFIX => {
            "A `^` or `~` appeared in the source without a following \
             alphanumeric command code. The prefix was skipped."
        }
        UNTERMINATED_FIELD_DATA => {
            "Field data started by ^FD, ^SN or ^FV must be closed by ^FS. \
             Without it the payload falls back to ending at the next command \
             prefix, which changes the meaning of any ^ or ~ inside the data."
        }
        UNTERMINATED_FORMAT_DOWNLOAD => {
            "A ^DF stored-format payload runs through its terminating ^XZ. \
             Input ended before one was found."
        }
        TRUNCATED_GRAPHIC_DATA => {
            "A ^GF or ~DG header declared more data bytes than the payload \
             provides. Missing rows render as white."
        }
        UNKNOWN_COMMAND => {
            "The command code is not one the renderer understands. The \
             command and its payload are skipped during execution."
        }
        PARAM_OUT_OF_RANGE => {
            "A numeric parameter was outside its documented range and was \
             clamped to the nearest bound."
        }
        PARAM_INVALID => {
            "A parameter could not be parsed as its documented type; the \
             documented default value was substituted."
        }
        MISSING_START => "No ^XA label-start marker was found in the input.",
        MISSING_TERMINATOR => "No ^XZ label-end marker was found in the input.",
        UNBALANCED_LABEL_MARKERS => {
            "The number of ^XA markers does not match the number of ^XZ \
             markers; one or more labels is unterminated or spurious."
        }
        INVALID_HEX_ESCAPE => {
            "An ^FH escape indicator was not followed by two hex digits. The \
             raw characters were kept in the field data."
        }
        GRAPHIC_DECODE_FAILED => {
            "Graphic field data could not be decoded as ASCII hex or Z64; \
             the image renders as a placeholder."
        }
        _ => return None,
    })
}
