//! ZPL font mapping and typeface resolution.
//!
//! ZPL selects fonts by a single identifier character; each id maps to a
//! family class, weight, and the aspect ratio used when the width
//! parameter is 0 (proportional). Families resolve against the system
//! font database once per process; resolved typefaces are cached so
//! elements can carry plain `{id, height, width}` snapshots and the
//! rasterizer looks the typeface up at draw time.

use ab_glyph::FontVec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Static style attributes of a ZPL font id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStyle {
    /// Candidate family names, most specific first.
    pub families: &'static [&'static str],
    /// Bold weight.
    pub bold: bool,
    /// Fixed-pitch family.
    pub monospace: bool,
    /// Width-to-height ratio applied when the ZPL width parameter is 0.
    pub aspect: f32,
}

const SWISS: &[&str] = &["Helvetica", "Arial", "Liberation Sans", "DejaVu Sans"];
const NARROW: &[&str] = &["Arial Narrow", "Liberation Sans Narrow", "DejaVu Sans Condensed"];
const MONO: &[&str] = &["Courier New", "Liberation Mono", "DejaVu Sans Mono"];
const OCR_B: &[&str] = &["OCR-B", "OCRB", "Liberation Mono", "DejaVu Sans Mono"];
const OCR_A: &[&str] = &["OCR-A", "OCRA", "Liberation Mono", "DejaVu Sans Mono"];

/// Style for a ZPL font identifier (exhaustive over `0`–`9`, `A`–`Z`;
/// anything else gets the Swiss-like default).
pub fn font_style(id: char) -> FontStyle {
    match id.to_ascii_uppercase() {
        '0' => FontStyle {
            families: SWISS,
            bold: true,
            monospace: false,
            aspect: 0.60,
        },
        'A' => FontStyle {
            families: MONO,
            bold: false,
            monospace: true,
            aspect: 0.56,
        },
        'B' => FontStyle {
            families: NARROW,
            bold: false,
            monospace: false,
            aspect: 0.64,
        },
        'C' | 'D' => FontStyle {
            families: SWISS,
            bold: false,
            monospace: false,
            aspect: 0.56,
        },
        'E' => FontStyle {
            families: OCR_B,
            bold: false,
            monospace: true,
            aspect: 0.54,
        },
        'F' => FontStyle {
            families: NARROW,
            bold: false,
            monospace: false,
            aspect: 0.50,
        },
        'G' => FontStyle {
            families: SWISS,
            bold: true,
            monospace: false,
            aspect: 0.67,
        },
        'H' => FontStyle {
            families: OCR_A,
            bold: false,
            monospace: true,
            aspect: 0.62,
        },
        _ => FontStyle {
            families: SWISS,
            bold: false,
            monospace: false,
            aspect: 0.60,
        },
    }
}

/// Process-wide typeface resolver backed by the system font database.
pub struct FontResolver {
    db: fontdb::Database,
    cache: Mutex<HashMap<(char, bool), Option<Arc<FontVec>>>>,
}

impl FontResolver {
    /// The shared resolver; system fonts are loaded on first use.
    pub fn global() -> &'static FontResolver {
        static RESOLVER: OnceLock<FontResolver> = OnceLock::new();
        RESOLVER.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            FontResolver {
                db,
                cache: Mutex::new(HashMap::new()),
            }
        })
    }

    /// Resolve the typeface for a ZPL font id, falling back to a default
    /// sans-serif. Returns `None` only when the system has no usable font
    /// at all.
    pub fn resolve(&self, id: char) -> Option<Arc<FontVec>> {
        let style = font_style(id);
        let key = (id.to_ascii_uppercase(), style.bold);
        if let Some(hit) = self.cache.lock().unwrap().get(&key) {
            return hit.clone();
        }
        let resolved = self.load(&style);
        self.cache.lock().unwrap().insert(key, resolved.clone());
        resolved
    }

    fn load(&self, style: &FontStyle) -> Option<Arc<FontVec>> {
        let mut families: Vec<fontdb::Family<'_>> = style
            .families
            .iter()
            .copied()
            .map(fontdb::Family::Name)
            .collect();
        families.push(if style.monospace {
            fontdb::Family::Monospace
        } else {
            fontdb::Family::SansSerif
        });
        families.push(fontdb::Family::SansSerif);

        let query = fontdb::Query {
            families: &families,
            weight: if style.bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        let face_id = self.db.query(&query)?;
        let (source, index) = self.db.face_source(face_id)?;
        let data = match source {
            fontdb::Source::Binary(bin) => bin.as_ref().as_ref().to_vec(),
            fontdb::Source::SharedFile(_, bin) => bin.as_ref().as_ref().to_vec(),
            fontdb::Source::File(path) => std::fs::read(path).ok()?,
        };
        FontVec::try_from_vec_and_index(data, index).ok().map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_documented_aspects() {
        assert_eq!(font_style('0').aspect, 0.60);
        assert!(font_style('0').bold);
        assert_eq!(font_style('A').aspect, 0.56);
        assert!(font_style('A').monospace);
        assert_eq!(font_style('B').aspect, 0.64);
        assert_eq!(font_style('C').aspect, 0.56);
        assert_eq!(font_style('D').aspect, 0.56);
        assert_eq!(font_style('E').aspect, 0.54);
        assert_eq!(font_style('F').aspect, 0.50);
        assert_eq!(font_style('G').aspect, 0.67);
        assert!(font_style('G').bold);
        assert_eq!(font_style('H').aspect, 0.62);
        // Everything else is Swiss-like at 0.60, regular weight.
        assert_eq!(font_style('Q').aspect, 0.60);
        assert!(!font_style('Q').bold);
        assert_eq!(font_style('@').aspect, 0.60);
    }

    #[test]
    fn lowercase_ids_map_like_uppercase() {
        assert_eq!(font_style('a'), font_style('A'));
    }

    #[test]
    fn resolver_is_consistent_across_calls() {
        let r = FontResolver::global();
        let first = r.resolve('0').is_some();
        let second = r.resolve('0').is_some();
        assert_eq!(first, second);
    }
}
