//! Positional parameter parsing for command payloads.
//!
//! ZPL parameters are comma separated, positional, and individually
//! optional. Bad numeric values fall back to the documented default;
//! out-of-range values clamp to the documented bounds. Both cases are
//! recorded as [`ParamIssue`]s so the caller can attach diagnostics.

/// What went wrong with a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamIssueKind {
    /// The value failed to parse as its documented type.
    Invalid,
    /// The value parsed but fell outside `[min, max]` and was clamped.
    OutOfRange {
        /// Lower documented bound.
        min: f64,
        /// Upper documented bound.
        max: f64,
    },
}

/// A recorded problem with one positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamIssue {
    /// Zero-based parameter index.
    pub index: usize,
    /// The raw text of the parameter.
    pub raw: String,
    /// The kind of problem.
    pub kind: ParamIssueKind,
}

/// Comma-split view over a command payload.
pub struct Params<'a> {
    parts: Vec<&'a str>,
    issues: Vec<ParamIssue>,
}

impl<'a> Params<'a> {
    /// Split a payload on commas, trimming each part.
    pub fn split(payload: &'a str) -> Self {
        let parts = if payload.trim().is_empty() {
            Vec::new()
        } else {
            payload.split(',').map(str::trim).collect()
        };
        Self {
            parts,
            issues: Vec::new(),
        }
    }

    /// Number of positional slots present.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// `true` when no parameters were given.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Raw trimmed text of parameter `i`, if present and non-empty.
    pub fn raw(&self, i: usize) -> Option<&'a str> {
        self.parts.get(i).copied().filter(|p| !p.is_empty())
    }

    /// Parameter `i` as an owned string.
    pub fn string(&self, i: usize) -> Option<String> {
        self.raw(i).map(str::to_string)
    }

    /// First character of parameter `i`, uppercased.
    pub fn char_at(&self, i: usize) -> Option<char> {
        self.raw(i)
            .and_then(|p| p.chars().next())
            .map(|c| c.to_ascii_uppercase())
    }

    /// First character of parameter `i`, uppercased, or `default`.
    pub fn char_or(&self, i: usize, default: char) -> char {
        self.char_at(i).unwrap_or(default)
    }

    /// `Y`/`N` flag at parameter `i`, or `default` when absent/unrecognized.
    pub fn flag_or(&self, i: usize, default: bool) -> bool {
        match self.char_at(i) {
            Some('Y') => true,
            Some('N') => false,
            _ => default,
        }
    }

    /// Parameter `i` as `u32`, if present and well-formed.
    pub fn u32(&mut self, i: usize) -> Option<u32> {
        self.parse_num::<u32>(i)
    }

    /// Parameter `i` as `u32`, or `default`.
    pub fn u32_or(&mut self, i: usize, default: u32) -> u32 {
        self.parse_num(i).unwrap_or(default)
    }

    /// Parameter `i` as `f32`, if present and well-formed.
    pub fn f32(&mut self, i: usize) -> Option<f32> {
        self.parse_num::<f32>(i)
    }

    /// Parameter `i` as `i32`, or `default`.
    pub fn i32_or(&mut self, i: usize, default: i32) -> i32 {
        self.parse_num(i).unwrap_or(default)
    }

    /// Parameter `i` as `u32`, defaulted then clamped to `[min, max]`.
    pub fn clamp_u32(&mut self, i: usize, default: u32, min: u32, max: u32) -> u32 {
        let v = self.u32_or(i, default);
        self.clamp_record(i, v, min, max)
    }

    /// Parameter `i` as `i32`, defaulted then clamped to `[min, max]`.
    pub fn clamp_i32(&mut self, i: usize, default: i32, min: i32, max: i32) -> i32 {
        let v = self.i32_or(i, default);
        self.clamp_record(i, v, min, max)
    }

    /// Problems recorded while parsing, in slot order.
    pub fn take_issues(&mut self) -> Vec<ParamIssue> {
        std::mem::take(&mut self.issues)
    }

    fn parse_num<T: std::str::FromStr>(&mut self, i: usize) -> Option<T> {
        let raw = self.raw(i)?;
        match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                self.issues.push(ParamIssue {
                    index: i,
                    raw: raw.to_string(),
                    kind: ParamIssueKind::Invalid,
                });
                None
            }
        }
    }

    fn clamp_record<T>(&mut self, i: usize, v: T, min: T, max: T) -> T
    where
        T: PartialOrd + Copy + Into<f64>,
    {
        if v < min || v > max {
            self.issues.push(ParamIssue {
                index: i,
                raw: self.raw(i).unwrap_or("").to_string(),
                kind: ParamIssueKind::OutOfRange {
                    min: min.into(),
                    max: max.into(),
                },
            });
            if v < min { min } else { max }
        } else {
            v
        }
    }
}
