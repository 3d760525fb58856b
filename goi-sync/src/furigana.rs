//! Furigana bracket-notation rendering
//!
//! Converts reading annotations of the form `word[reading]` into ruby
//! markup. Segments are space-delimited; the separator spaces exist only
//! to bound the base text and are consumed in the output.

use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use regex::Regex;

/// `base[reading]` with optional trailing plain text (okurigana).
static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\[\]]+)\[([^\[\]]*)\](.*)$").expect("furigana pattern"));

/// Render bracket-notation furigana as ruby markup.
///
/// `食[た]べる 物[もの]` becomes
/// `<ruby>食<rt>た</rt></ruby>べる<ruby>物<rt>もの</rt></ruby>`.
/// Segments without a bracket pass through unchanged; an empty reading
/// leaves the base text bare.
pub fn render_furigana(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        match SEGMENT.captures(segment) {
            Some(caps) => {
                let base = &caps[1];
                let reading = &caps[2];
                let rest = &caps[3];
                if reading.is_empty() {
                    out.push_str(&escape(base));
                } else {
                    out.push_str("<ruby>");
                    out.push_str(&escape(base));
                    out.push_str("<rt>");
                    out.push_str(&escape(reading));
                    out.push_str("</rt></ruby>");
                }
                out.push_str(&escape(rest));
            }
            None => out.push_str(&escape(segment)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment() {
        assert_eq!(
            render_furigana("食[た]べる"),
            "<ruby>食<rt>た</rt></ruby>べる"
        );
    }

    #[test]
    fn multiple_segments_consume_separator_spaces() {
        assert_eq!(
            render_furigana("今日[きょう] は 良[よ]い 天気[てんき]"),
            "<ruby>今日<rt>きょう</rt></ruby>は<ruby>良<rt>よ</rt></ruby>い<ruby>天気<rt>てんき</rt></ruby>"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(render_furigana("たべる"), "たべる");
        assert_eq!(render_furigana(""), "");
    }

    #[test]
    fn empty_reading_leaves_base_bare() {
        assert_eq!(render_furigana("食[]べる"), "食べる");
    }

    #[test]
    fn markup_in_input_is_escaped() {
        assert_eq!(
            render_furigana("a<b>[x]"),
            "<ruby>a&lt;b&gt;<rt>x</rt></ruby>"
        );
    }
}
