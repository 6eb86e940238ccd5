//! Linear (1-D) symbology encoders.
//!
//! Each encoder produces one row of pixels as a `Vec<bool>` (true = bar),
//! already at device resolution: a narrow element spans `module` pixels
//! and, for the ratio symbologies, a wide element spans
//! `round(module · ratio)` pixels. The drawer extrudes the row to the bar
//! height and never rescales horizontally, so fractional ratios survive.

use zpl_preview_core::BarcodeKind;

/// Why content could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearError {
    /// A character outside the symbology's character set.
    BadCharacter(char),
    /// Content length invalid for the symbology.
    BadLength {
        /// What the symbology requires.
        expected: &'static str,
        /// What was supplied.
        got: usize,
    },
    /// Empty content.
    Empty,
}

impl std::fmt::Display for LinearError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearError::BadCharacter(c) => write!(f, "character {c:?} not encodable"),
            LinearError::BadLength { expected, got } => {
                write!(f, "expected {expected} characters, got {got}")
            }
            LinearError::Empty => write!(f, "empty barcode content"),
        }
    }
}

impl std::error::Error for LinearError {}

/// Encode `content` for a linear symbology.
pub fn encode_linear(
    kind: BarcodeKind,
    content: &str,
    module: u32,
    ratio: f32,
    check_digit: bool,
) -> Result<Vec<bool>, LinearError> {
    if content.is_empty() {
        return Err(LinearError::Empty);
    }
    let module = module.max(1);
    match kind {
        BarcodeKind::Code128 => code128(content, module),
        BarcodeKind::Code39 => code39(content, module, ratio, check_digit),
        BarcodeKind::Code93 => code93(content, module),
        BarcodeKind::Ean13 => ean13(content, module),
        BarcodeKind::UpcA => upca(content, module),
        BarcodeKind::Interleaved2of5 => itf(content, module, ratio, check_digit),
        BarcodeKind::Codabar => codabar(content, module, ratio),
        _ => unreachable!("not a linear symbology: {kind:?}"),
    }
}

/// Row builder: appends alternating runs of bar/space pixels.
struct Row {
    out: Vec<bool>,
}

impl Row {
    fn new() -> Self {
        Self { out: Vec::new() }
    }

    fn run(&mut self, bar: bool, px: u32) {
        self.out.extend(std::iter::repeat_n(bar, px as usize));
    }

    /// Append a width pattern like `"212222"`: digits are module counts,
    /// elements alternate bar/space starting with a bar.
    fn widths(&mut self, pattern: &str, module: u32) {
        for (i, ch) in pattern.bytes().enumerate() {
            let n = (ch - b'0') as u32;
            self.run(i % 2 == 0, n * module);
        }
    }

    /// Append a bit pattern like `"101"`: each char is one module.
    fn bits(&mut self, pattern: &str, module: u32) {
        for ch in pattern.bytes() {
            self.run(ch == b'1', module);
        }
    }

    /// Append a narrow/wide pattern like `"nwn"`, elements alternating
    /// bar/space starting with a bar.
    fn narrow_wide(&mut self, pattern: &str, narrow: u32, wide: u32) {
        for (i, ch) in pattern.bytes().enumerate() {
            self.run(i % 2 == 0, if ch == b'w' { wide } else { narrow });
        }
    }
}

fn wide_px(module: u32, ratio: f32) -> u32 {
    ((module as f32 * ratio).round() as u32).max(module + 1)
}

// ── Code 128 ────────────────────────────────────────────────────────────

const CODE128_PATTERNS: [&str; 106] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232",
];
const CODE128_STOP: &str = "2331112";
const CODE128_START_B: u32 = 104;
const CODE128_START_C: u32 = 105;

fn code128(content: &str, module: u32) -> Result<Vec<bool>, LinearError> {
    // Subset C for even all-digit content of useful length, else subset B.
    let digits_only = content.bytes().all(|b| b.is_ascii_digit());
    let use_c = digits_only && content.len() >= 4 && content.len() % 2 == 0;

    let mut values: Vec<u32> = Vec::with_capacity(content.len() + 2);
    if use_c {
        values.push(CODE128_START_C);
        for pair in content.as_bytes().chunks(2) {
            values.push(((pair[0] - b'0') as u32) * 10 + (pair[1] - b'0') as u32);
        }
    } else {
        values.push(CODE128_START_B);
        for ch in content.chars() {
            let b = ch as u32;
            if !(32..=126).contains(&b) {
                return Err(LinearError::BadCharacter(ch));
            }
            values.push(b - 32);
        }
    }

    let checksum = values
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, v)| acc + v * (i as u32).max(1))
        % 103;
    values.push(checksum);

    let mut row = Row::new();
    for v in values {
        row.widths(CODE128_PATTERNS[v as usize], module);
    }
    row.widths(CODE128_STOP, module);
    Ok(row.out)
}

// ── Code 39 ─────────────────────────────────────────────────────────────

const CODE39_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";
const CODE39_PATTERNS: [&str; 43] = [
    "nnnwwnwnn", "wnnwnnnnw", "nnwwnnnnw", "wnwwnnnnn", "nnnwwnnnw", "wnnwwnnnn", "nnwwwnnnn",
    "nnnwnnwnw", "wnnwnnwnn", "nnwwnnwnn", "wnnnnwnnw", "nnwnnwnnw", "wnwnnwnnn", "nnnnwwnnw",
    "wnnnwwnnn", "nnwnwwnnn", "nnnnnwwnw", "wnnnnwwnn", "nnwnnwwnn", "nnnnwwwnn", "wnnnnnnww",
    "nnwnnnnww", "wnwnnnnwn", "nnnnwnnww", "wnnnwnnwn", "nnwnwnnwn", "nnnnnnwww", "wnnnnnwwn",
    "nnwnnnwwn", "nnnnwnwwn", "wwnnnnnnw", "nwwnnnnnw", "wwwnnnnnn", "nwnnwnnnw", "wwnnwnnnn",
    "nwwnwnnnn", "nwnnnnwnw", "wwnnnnwnn", "nwwnnnwnn", "nwnwnwnnn", "nwnwnnnwn", "nwnnnwnwn",
    "nnnwnwnwn",
];
const CODE39_START_STOP: &str = "nwnnwnwnn";

fn code39(
    content: &str,
    module: u32,
    ratio: f32,
    check_digit: bool,
) -> Result<Vec<bool>, LinearError> {
    let wide = wide_px(module, ratio);
    let mut indices = Vec::with_capacity(content.len() + 1);
    for ch in content.chars() {
        let up = ch.to_ascii_uppercase();
        let idx = CODE39_CHARSET
            .find(up)
            .ok_or(LinearError::BadCharacter(ch))?;
        indices.push(idx);
    }
    if check_digit {
        let sum: usize = indices.iter().sum();
        indices.push(sum % 43);
    }

    let mut row = Row::new();
    row.narrow_wide(CODE39_START_STOP, module, wide);
    for idx in indices {
        row.run(false, module);
        row.narrow_wide(CODE39_PATTERNS[idx], module, wide);
    }
    row.run(false, module);
    row.narrow_wide(CODE39_START_STOP, module, wide);
    Ok(row.out)
}

// ── Code 93 ─────────────────────────────────────────────────────────────

const CODE93_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";
const CODE93_PATTERNS: [&str; 47] = [
    "131112", "111213", "111312", "111411", "121113", "121212", "121311", "111114", "131211",
    "141111", "211113", "211212", "211311", "221112", "221211", "231111", "112113", "112212",
    "112311", "122112", "132111", "111123", "111222", "111321", "121122", "131121", "212112",
    "212211", "211122", "211221", "221121", "222111", "112122", "112221", "122121", "123111",
    "121131", "311112", "311211", "321111", "112131", "113121", "211131", "121221", "312111",
    "311121", "122211",
];
const CODE93_START_STOP: &str = "111141";

fn code93(content: &str, module: u32) -> Result<Vec<bool>, LinearError> {
    let mut indices = Vec::with_capacity(content.len() + 2);
    for ch in content.chars() {
        let up = ch.to_ascii_uppercase();
        let idx = CODE93_CHARSET
            .find(up)
            .ok_or(LinearError::BadCharacter(ch))?;
        indices.push(idx);
    }
    // Check characters C (weights 1–20) and K (weights 1–15), both from
    // the rightmost character.
    for max_weight in [20usize, 15] {
        let sum: usize = indices
            .iter()
            .rev()
            .enumerate()
            .map(|(i, &v)| (i % max_weight + 1) * v)
            .sum();
        indices.push(sum % 47);
    }

    let mut row = Row::new();
    row.widths(CODE93_START_STOP, module);
    for idx in indices {
        row.widths(CODE93_PATTERNS[idx], module);
    }
    row.widths(CODE93_START_STOP, module);
    row.run(true, module); // termination bar
    Ok(row.out)
}

// ── EAN-13 / UPC-A ──────────────────────────────────────────────────────

const EAN_L: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];
/// First-digit parity for the left half of an EAN-13 (`L`/`G` per column).
const EAN_PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

fn ean_r(digit: usize) -> String {
    EAN_L[digit]
        .bytes()
        .map(|b| if b == b'1' { '0' } else { '1' })
        .collect()
}

fn ean_g(digit: usize) -> String {
    ean_r(digit).chars().rev().collect()
}

fn digit_values(content: &str) -> Result<Vec<usize>, LinearError> {
    content
        .chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as usize)
                .ok_or(LinearError::BadCharacter(c))
        })
        .collect()
}

/// Standard EAN/UPC mod-10 check digit over the given digits.
fn mod10_check(digits: &[usize]) -> usize {
    let sum: usize = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d * 3 } else { d })
        .sum();
    (10 - sum % 10) % 10
}

fn ean13(content: &str, module: u32) -> Result<Vec<bool>, LinearError> {
    let digits = digit_values(content)?;
    if digits.len() != 12 && digits.len() != 13 {
        return Err(LinearError::BadLength {
            expected: "12 or 13 digits",
            got: digits.len(),
        });
    }
    let body = &digits[..12];
    let check = mod10_check(body);

    let parity = EAN_PARITY[body[0]];
    let mut row = Row::new();
    row.bits("101", module);
    for (i, &d) in body[1..7].iter().enumerate() {
        match parity.as_bytes()[i] {
            b'G' => row.bits(&ean_g(d), module),
            _ => row.bits(EAN_L[d], module),
        }
    }
    row.bits("01010", module);
    for &d in &body[7..12] {
        row.bits(&ean_r(d), module);
    }
    row.bits(&ean_r(check), module);
    row.bits("101", module);
    Ok(row.out)
}

fn upca(content: &str, module: u32) -> Result<Vec<bool>, LinearError> {
    let mut digits = digit_values(content)?;
    match digits.len() {
        11 => {
            let check = mod10_check(&digits);
            digits.push(check);
        }
        12 => {}
        n => {
            return Err(LinearError::BadLength {
                expected: "11 or 12 digits",
                got: n,
            });
        }
    }

    let mut row = Row::new();
    row.bits("101", module);
    for &d in &digits[..6] {
        row.bits(EAN_L[d], module);
    }
    row.bits("01010", module);
    for &d in &digits[6..] {
        row.bits(&ean_r(d), module);
    }
    row.bits("101", module);
    Ok(row.out)
}

// ── Interleaved 2 of 5 ──────────────────────────────────────────────────

const ITF_PATTERNS: [&str; 10] = [
    "nnwwn", "wnnnw", "nwnnw", "wwnnn", "nnwnw", "wnwnn", "nwwnn", "nnnww", "wnnwn", "nwnwn",
];

fn itf(
    content: &str,
    module: u32,
    ratio: f32,
    check_digit: bool,
) -> Result<Vec<bool>, LinearError> {
    let mut digits = digit_values(content)?;
    if check_digit {
        digits.push(mod10_check(&digits));
    }
    if digits.len() % 2 != 0 {
        digits.insert(0, 0);
    }
    let wide = wide_px(module, ratio);

    let mut row = Row::new();
    // Start: four narrow elements.
    row.run(true, module);
    row.run(false, module);
    row.run(true, module);
    row.run(false, module);
    for pair in digits.chunks(2) {
        let bars = ITF_PATTERNS[pair[0]].as_bytes();
        let spaces = ITF_PATTERNS[pair[1]].as_bytes();
        for i in 0..5 {
            row.run(true, if bars[i] == b'w' { wide } else { module });
            row.run(false, if spaces[i] == b'w' { wide } else { module });
        }
    }
    // Stop: wide bar, narrow space, narrow bar.
    row.run(true, wide);
    row.run(false, module);
    row.run(true, module);
    Ok(row.out)
}

// ── Codabar ─────────────────────────────────────────────────────────────

const CODABAR_CHARSET: &str = "0123456789-$:/.+ABCD";
const CODABAR_PATTERNS: [&str; 20] = [
    "nnnnnww", "nnnnwwn", "nnnwnnw", "wwnnnnn", "nnwnnwn", "wnnnnwn", "nwnnnnw", "nwnnwnn",
    "nwwnnnn", "wnnwnnn", "nnnwwnn", "nnwwnnn", "wnnnwnw", "wnwnnnw", "wnwnwnn", "nnwnwnw",
    "nnwwnwn", "nwnwnnw", "nnnwnww", "nnnwwwn",
];

fn codabar(content: &str, module: u32, ratio: f32) -> Result<Vec<bool>, LinearError> {
    let wide = wide_px(module, ratio);
    // Wrap with the default A start/stop characters when absent.
    let has_guards = content.len() >= 2
        && content
            .chars()
            .next()
            .is_some_and(|c| matches!(c.to_ascii_uppercase(), 'A'..='D'))
        && content
            .chars()
            .last()
            .is_some_and(|c| matches!(c.to_ascii_uppercase(), 'A'..='D'));
    let wrapped = if has_guards {
        content.to_string()
    } else {
        format!("A{content}A")
    };

    let mut row = Row::new();
    for (i, ch) in wrapped.chars().enumerate() {
        let up = ch.to_ascii_uppercase();
        let idx = CODABAR_CHARSET
            .find(up)
            .ok_or(LinearError::BadCharacter(ch))?;
        if i > 0 {
            row.run(false, module);
        }
        row.narrow_wide(CODABAR_PATTERNS[idx], module, wide);
    }
    Ok(row.out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules(row: &[bool]) -> usize {
        row.len()
    }

    #[test]
    fn code128_structure() {
        let row = encode_linear(BarcodeKind::Code128, "HELLO", 1, 3.0, false).unwrap();
        // start + 5 chars + check = 7 codewords of 11 modules, stop = 13.
        assert_eq!(modules(&row), 7 * 11 + 13);
        assert!(row[0], "starts with a bar");
        assert!(*row.last().unwrap(), "ends with a bar");
    }

    #[test]
    fn code128_subset_c_halves_digit_codewords() {
        let row = encode_linear(BarcodeKind::Code128, "123456", 1, 3.0, false).unwrap();
        // start + 3 pairs + check = 5 codewords + stop.
        assert_eq!(modules(&row), 5 * 11 + 13);
    }

    #[test]
    fn code128_module_width_scales_linearly() {
        let one = encode_linear(BarcodeKind::Code128, "AB", 1, 3.0, false).unwrap();
        let three = encode_linear(BarcodeKind::Code128, "AB", 3, 3.0, false).unwrap();
        assert_eq!(one.len() * 3, three.len());
    }

    #[test]
    fn code128_rejects_non_ascii() {
        assert_eq!(
            encode_linear(BarcodeKind::Code128, "héllo", 1, 3.0, false),
            Err(LinearError::BadCharacter('é'))
        );
    }

    #[test]
    fn code39_character_count_drives_width() {
        let row = encode_linear(BarcodeKind::Code39, "AB", 1, 3.0, false).unwrap();
        // Each of the 4 pattern groups (guard, A, B, guard): 6 narrow + 3
        // wide = 15 modules at ratio 3; plus 3 inter-character gaps.
        assert_eq!(modules(&row), 4 * 15 + 3);
        let checked = encode_linear(BarcodeKind::Code39, "AB", 1, 3.0, true).unwrap();
        assert_eq!(modules(&checked), 5 * 15 + 4);
    }

    #[test]
    fn code39_ratio_changes_wide_elements() {
        let tight = encode_linear(BarcodeKind::Code39, "A", 2, 2.0, false).unwrap();
        let loose = encode_linear(BarcodeKind::Code39, "A", 2, 3.0, false).unwrap();
        assert!(loose.len() > tight.len());
    }

    #[test]
    fn code93_has_two_check_characters() {
        let row = encode_linear(BarcodeKind::Code93, "WIKI", 1, 3.0, false).unwrap();
        // guard + 4 data + C + K + guard, 9 modules each, + termination.
        assert_eq!(modules(&row), 9 * 8 + 1);
    }

    #[test]
    fn ean13_is_95_modules() {
        let row = encode_linear(BarcodeKind::Ean13, "400638133393", 2, 3.0, false).unwrap();
        assert_eq!(modules(&row), 95 * 2);
        let with_check = encode_linear(BarcodeKind::Ean13, "4006381333931", 2, 3.0, false).unwrap();
        assert_eq!(with_check, row, "13th digit is recomputed");
    }

    #[test]
    fn ean13_rejects_bad_content() {
        assert!(matches!(
            encode_linear(BarcodeKind::Ean13, "ABCDEF", 2, 3.0, false),
            Err(LinearError::BadCharacter('A'))
        ));
        assert!(matches!(
            encode_linear(BarcodeKind::Ean13, "1234", 2, 3.0, false),
            Err(LinearError::BadLength { .. })
        ));
    }

    #[test]
    fn upca_is_95_modules() {
        let row = encode_linear(BarcodeKind::UpcA, "03600029145", 1, 3.0, false).unwrap();
        assert_eq!(modules(&row), 95);
    }

    #[test]
    fn itf_pads_odd_input_to_even() {
        let odd = encode_linear(BarcodeKind::Interleaved2of5, "123", 1, 2.0, false).unwrap();
        let padded = encode_linear(BarcodeKind::Interleaved2of5, "0123", 1, 2.0, false).unwrap();
        assert_eq!(odd, padded);
    }

    #[test]
    fn codabar_wraps_bare_content_with_a_guards() {
        let bare = encode_linear(BarcodeKind::Codabar, "123", 1, 2.5, false).unwrap();
        let wrapped = encode_linear(BarcodeKind::Codabar, "A123A", 1, 2.5, false).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn empty_content_is_an_error() {
        assert_eq!(
            encode_linear(BarcodeKind::Code128, "", 2, 3.0, false),
            Err(LinearError::Empty)
        );
    }

    #[test]
    fn mod10_check_matches_known_ean() {
        // 4006381333931 is a published EAN-13 example.
        let digits: Vec<usize> = "400638133393"
            .chars()
            .map(|c| c.to_digit(10).unwrap() as usize)
            .collect();
        assert_eq!(mod10_check(&digits), 1);
    }
}
