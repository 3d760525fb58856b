//! Jisho dictionary API client
//!
//! Queries the public word-search endpoint and maps results into typed
//! entries. Only JMdict-attributed results are kept, and encyclopedia
//! senses are dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use goi_common::{Error, Result};

use crate::normalize::to_hiragana;

const JISHO_BASE_URL: &str = "https://jisho.org/api/v1/search/words";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchResult {
    #[serde(default)]
    attribution: Value,
    #[serde(default)]
    japanese: Vec<JapaneseForm>,
    #[serde(default)]
    senses: Vec<RawSense>,
    #[serde(default)]
    jlpt: Vec<String>,
    #[serde(default)]
    is_common: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct JapaneseForm {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    reading: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSense {
    #[serde(default)]
    english_definitions: Vec<String>,
    #[serde(default)]
    parts_of_speech: Vec<String>,
    #[serde(default)]
    see_also: Vec<String>,
}

/// One mapped dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictEntry {
    pub word: String,
    pub reading: String,
    /// Alternate spellings, formatted `word (reading)`
    pub alternates: Vec<String>,
    pub senses: Vec<DictSense>,
    pub jlpt: Vec<String>,
    pub common: bool,
    pub related: Vec<String>,
}

/// One sense of a dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictSense {
    pub text: String,
    pub part: String,
}

/// Jisho API client
pub struct JishoClient {
    http_client: reqwest::Client,
}

impl JishoClient {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http_client })
    }

    /// Search by keyword, mapped and filtered to dictionary entries.
    pub async fn search(&self, keyword: &str) -> Result<Vec<DictEntry>> {
        tracing::debug!(keyword = %keyword, "Querying dictionary API");

        let response = self
            .http_client
            .get(JISHO_BASE_URL)
            .query(&[("keyword", keyword)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        let entries = map_results(body.data);
        tracing::debug!(keyword = %keyword, count = entries.len(), "Dictionary results mapped");
        Ok(entries)
    }

    /// Search narrowed by an optional exact reading and, with `exact`, an
    /// exact word. Katakana input is folded to hiragana for comparison.
    pub async fn lookup(
        &self,
        word: &str,
        reading: Option<&str>,
        exact: bool,
    ) -> Result<Vec<DictEntry>> {
        let mut entries = self.search(word).await?;

        if let Some(reading) = reading {
            let folded = to_hiragana(reading);
            entries.retain(|e| e.reading == reading || e.reading == folded);
        }
        if exact {
            let folded = to_hiragana(word);
            entries.retain(|e| e.word == word || e.word == folded);
        }
        Ok(entries)
    }
}

fn map_results(results: Vec<SearchResult>) -> Vec<DictEntry> {
    results.into_iter().filter_map(map_result).collect()
}

fn map_result(result: SearchResult) -> Option<DictEntry> {
    if !is_jmdict_attributed(&result.attribution) {
        return None;
    }

    let mut forms = result.japanese.into_iter();
    let first = forms.next()?;

    let alternates = forms
        .map(|form| {
            let word = form.word.unwrap_or_default();
            match form.reading {
                Some(reading) if !reading.is_empty() => format!("{} ({})", word, reading),
                _ => word,
            }
        })
        .collect();

    let mut related = Vec::new();
    let senses: Vec<DictSense> = result
        .senses
        .into_iter()
        .map(|sense| {
            related.extend(sense.see_also);
            DictSense {
                text: sense.english_definitions.join(", "),
                part: sense
                    .parts_of_speech
                    .iter()
                    .map(|part| map_part_of_speech(part))
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
        .filter(|sense| sense.part != "wikipedia")
        .collect();

    Some(DictEntry {
        word: first.word.unwrap_or_default(),
        reading: first.reading.unwrap_or_default(),
        alternates,
        senses,
        jlpt: result.jlpt,
        common: result.is_common.unwrap_or(false),
        related,
    })
}

/// The attribution slot is `false` for absent sources and truthy (a bool
/// or a source string) otherwise.
fn is_jmdict_attributed(attribution: &Value) -> bool {
    match attribution.get("jmdict") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Normalize the API's verbose part-of-speech names into tag form.
fn map_part_of_speech(part: &str) -> String {
    let lower = part.to_lowercase();
    match lower.as_str() {
        "wikipedia definition" => "wikipedia".to_string(),
        "usually written using kana alone" => "kana".to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<SearchResult> {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "data": [
                    {
                        "attribution": {"jmdict": true, "jmnedict": false, "dbpedia": false},
                        "is_common": true,
                        "jlpt": ["jlpt-n5"],
                        "japanese": [
                            {"word": "食べる", "reading": "たべる"},
                            {"word": "喰べる", "reading": "たべる"}
                        ],
                        "senses": [
                            {
                                "english_definitions": ["to eat"],
                                "parts_of_speech": ["Ichidan verb", "Transitive verb"],
                                "see_also": ["食う"]
                            },
                            {
                                "english_definitions": ["Eating"],
                                "parts_of_speech": ["Wikipedia definition"],
                                "see_also": []
                            }
                        ]
                    },
                    {
                        "attribution": {"jmdict": false, "jmnedict": false, "dbpedia": "http://dbpedia.org"},
                        "japanese": [{"word": "たべもの", "reading": "たべもの"}],
                        "senses": []
                    }
                ]
            }"#,
        )
        .unwrap();
        body.data
    }

    #[test]
    fn keeps_only_jmdict_attributed_results() {
        let entries = map_results(fixture());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "食べる");
    }

    #[test]
    fn maps_senses_and_drops_encyclopedia_entries() {
        let entries = map_results(fixture());
        let senses = &entries[0].senses;
        assert_eq!(senses.len(), 1);
        assert_eq!(senses[0].text, "to eat");
        assert_eq!(senses[0].part, "ichidan verb, transitive verb");
        assert_eq!(entries[0].related, vec!["食う".to_string()]);
    }

    #[test]
    fn formats_alternates_with_readings() {
        let entries = map_results(fixture());
        assert_eq!(entries[0].alternates, vec!["喰べる (たべる)".to_string()]);
    }

    #[test]
    fn part_of_speech_renames() {
        assert_eq!(map_part_of_speech("Wikipedia definition"), "wikipedia");
        assert_eq!(map_part_of_speech("Usually written using kana alone"), "kana");
        assert_eq!(map_part_of_speech("Noun"), "noun");
    }

    #[test]
    fn attribution_truthiness() {
        assert!(is_jmdict_attributed(&serde_json::json!({"jmdict": true})));
        assert!(is_jmdict_attributed(
            &serde_json::json!({"jmdict": "jmdict"})
        ));
        assert!(!is_jmdict_attributed(&serde_json::json!({"jmdict": false})));
        assert!(!is_jmdict_attributed(&serde_json::json!({})));
    }
}
