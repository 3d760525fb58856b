//! Traditional radical reference table
//!
//! Embedded table of the traditional kanji radicals and their common
//! variants, keyed by glyph. Based on
//! <https://kanjialive.com/214-traditional-kanji-radicals/>.

use once_cell::sync::Lazy;

/// One radical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Radical {
    /// Stroke count of the radical
    pub strokes: u8,
    /// Radical glyph; empty for variant rows with no standalone glyph
    pub radical: String,
    /// Typical position within a kanji (left, right, top, ...)
    pub position: String,
    /// Primary meaning
    pub meaning: String,
    /// Additional meanings and variant notes
    pub notes: String,
    /// Marked as one of the radicals worth memorizing first
    pub important: bool,
}

/// A run of annotated text: either a known radical or raw characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadicalSegment<'a> {
    Radical(&'a Radical),
    Raw(String),
}

static TABLE: Lazy<Vec<Radical>> = Lazy::new(|| {
    include_str!("../assets/radicals.tsv")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut columns = line.split('\t');
            let mut next = || columns.next().unwrap_or("").to_string();
            let strokes = next().parse().unwrap_or(0);
            let radical = next();
            let position = next();
            let meaning = next();
            let notes = next();
            let important = next() == "Important";
            Radical {
                strokes,
                radical,
                position,
                meaning,
                notes,
                important,
            }
        })
        .collect()
});

/// The full radical table, in stroke order.
pub fn table() -> &'static [Radical] {
    &TABLE
}

/// Record for one radical glyph, if the table knows it.
pub fn lookup(glyph: char) -> Option<&'static Radical> {
    let mut buf = [0u8; 4];
    let glyph = &*glyph.encode_utf8(&mut buf);
    TABLE.iter().find(|r| r.radical == glyph)
}

/// Map each character of `text` to its radical record; characters the
/// table does not know are grouped into raw-text runs.
pub fn annotate(text: &str) -> Vec<RadicalSegment<'static>> {
    let mut out: Vec<RadicalSegment<'static>> = Vec::new();
    for c in text.chars() {
        match lookup(c) {
            Some(radical) => out.push(RadicalSegment::Radical(radical)),
            None => {
                if let Some(RadicalSegment::Raw(run)) = out.last_mut() {
                    run.push(c);
                } else {
                    out.push(RadicalSegment::Raw(c.to_string()));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_loads_in_stroke_order() {
        let table = table();
        assert!(table.len() > 300);
        assert_eq!(table[0].strokes, 1);
        assert_eq!(table[0].meaning, "one");
        assert!(table.windows(2).all(|w| w[0].strokes <= w[1].strokes));
    }

    #[test]
    fn lookup_finds_glyphs_and_flags() {
        let water = lookup('⺡').unwrap();
        assert_eq!(water.strokes, 3);
        assert_eq!(water.position, "left");
        assert!(water.important);

        let one = lookup('⼀').unwrap();
        assert!(!one.important);

        assert!(lookup('あ').is_none());
    }

    #[test]
    fn annotate_groups_unknown_runs() {
        let segments = annotate("⺡あい⼀");
        assert_eq!(segments.len(), 3);
        assert!(matches!(&segments[0], RadicalSegment::Radical(r) if r.meaning == "water"));
        assert!(matches!(&segments[1], RadicalSegment::Raw(s) if s == "あい"));
        assert!(matches!(&segments[2], RadicalSegment::Radical(r) if r.meaning == "one"));
    }

    #[test]
    fn annotate_empty_is_empty() {
        assert!(annotate("").is_empty());
    }
}
