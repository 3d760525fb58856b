//! Text normalization helpers
//!
//! Stateless pure functions with no failure modes: absence of a match
//! yields an empty result, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

static CORPUS_FREQUENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Corpus:\s*(\d+)").expect("frequency pattern"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Extract the first corpus rank from a frequency annotation fragment,
/// e.g. `"Corpus: 4821 (news)"` → `"4821"`. No match yields empty.
pub fn extract_frequency(fragment: &str) -> String {
    CORPUS_FREQUENCY
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Strip scraper noise from a raw example sentence: ASCII and Latin-1
/// punctuation-range characters are removed and whitespace runs collapse
/// to single spaces.
pub fn clean_sentence(fragment: &str) -> String {
    let stripped: String = fragment
        .chars()
        .filter(|&c| !is_punctuation_noise(c))
        .collect();
    WHITESPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}

/// ASCII punctuation blocks plus the Latin-1 punctuation/symbol range.
fn is_punctuation_noise(c: char) -> bool {
    matches!(c,
        '!'..='/' | ':'..='@' | '['..='`' | '{'..='~' | '\u{a1}'..='\u{bf}')
}

/// Fold katakana into hiragana; other characters pass through. Used for
/// dictionary reading comparisons where either script may appear.
pub fn to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            // katakana ァ..ヶ sit one fixed offset above hiragana ぁ..ゖ
            '\u{30a1}'..='\u{30f6}' => {
                char::from_u32(c as u32 - 0x60).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Strip the common leading indentation of a multi-line template literal
/// and convert tabs to spaces, so templates can be written indented in
/// source but emitted flush-left.
pub fn dedent(text: &str) -> String {
    let mut lines: Vec<&str> = text.split(['\n']).map(|l| l.strip_suffix('\r').unwrap_or(l)).collect();
    if lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let indent = lines
        .iter()
        .find(|l| !l.trim().is_empty())
        .map(|l| &l[..l.len() - l.trim_start().len()])
        .unwrap_or("");

    lines
        .iter()
        .map(|line| {
            let line = line.strip_prefix(indent).unwrap_or(line);
            line.trim_end().replace('\t', "    ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_extracts_first_corpus_rank() {
        assert_eq!(extract_frequency("Corpus: 4821 (news)"), "4821");
        assert_eq!(extract_frequency("Corpus:12"), "12");
        assert_eq!(
            extract_frequency("Anime & Jdrama: 900, Corpus: 120, Corpus: 500"),
            "120"
        );
    }

    #[test]
    fn frequency_without_marker_is_empty() {
        assert_eq!(extract_frequency(""), "");
        assert_eq!(extract_frequency("Innocent Ranked: 4000"), "");
        assert_eq!(extract_frequency("Corpus: none"), "");
    }

    #[test]
    fn sentence_cleanup_strips_punctuation_noise() {
        assert_eq!(clean_sentence("ご飯を食べる。"), "ご飯を食べる。");
        assert_eq!(clean_sentence("-- ご飯を 食べる --"), "ご飯を 食べる");
        assert_eq!(clean_sentence("  ¿ご飯?  "), "ご飯");
    }

    #[test]
    fn sentence_cleanup_collapses_whitespace() {
        assert_eq!(clean_sentence("a   b\n\tc"), "a b c");
        assert_eq!(clean_sentence("   \n "), "");
    }

    #[test]
    fn katakana_folds_to_hiragana() {
        assert_eq!(to_hiragana("タベル"), "たべる");
        assert_eq!(to_hiragana("たべる"), "たべる");
        assert_eq!(to_hiragana("ギン gin 銀"), "ぎん gin 銀");
        // prolonged sound mark has no hiragana counterpart
        assert_eq!(to_hiragana("ラーメン"), "らーめん");
    }

    #[test]
    fn dedent_strips_common_indentation() {
        let input = "\n\t\t<h1>title</h1>\n\t\t\t<p>body</p>\n\t";
        assert_eq!(dedent(input), "<h1>title</h1>\n    <p>body</p>");
    }

    #[test]
    fn dedent_passes_flush_text_through() {
        assert_eq!(dedent("a\nb"), "a\nb");
        assert_eq!(dedent(""), "");
    }
}
