//! Deck source readers
//!
//! Maps notes from the two source decks into typed entries: the
//! dictionary-scraper deck (glossary markup, tags, furigana, frequency)
//! and the curated vocabulary deck (audio, core ordering, example
//! sentences). The field names on the right-hand side are the external
//! decks' own schemas and are not ours to rename.

use goi_common::anki::{AnkiClient, NoteInfo, NoteQuery};
use goi_common::config::GoiConfig;
use goi_common::Result;

use crate::tags;

/// Tag on scraper-deck notes that have not been synchronized yet.
const SCRAPER_NEW_TAG: &str = "scraper-new";

/// One entry from the dictionary-scraper deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperEntry {
    pub note_id: i64,
    /// Sync key: the plain furigana spelling, unique per word+reading
    pub key: String,
    pub word: String,
    pub reading: String,
    /// Raw glossary markup, input to the canonicalization pipeline
    pub glossary: String,
    /// Entry tags with dictionary-source noise removed
    pub tags: Vec<String>,
    pub furigana_text: String,
    pub furigana_markup: String,
    pub sentence: String,
    pub frequency: String,
}

impl ScraperEntry {
    pub fn from_note(note: &NoteInfo) -> Self {
        Self {
            note_id: note.note_id,
            key: note.field("furigana-plain").to_string(),
            word: note.field("expression").to_string(),
            reading: note.field("reading").to_string(),
            glossary: note.field("glossary").to_string(),
            tags: split_entry_tags(note.field("tags")),
            furigana_text: note.field("furigana-plain").to_string(),
            furigana_markup: note.field("furigana").to_string(),
            sentence: note.field("sentence").to_string(),
            frequency: note.field("frequencies").to_string(),
        }
    }
}

/// One entry from the curated vocabulary deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedEntry {
    pub note_id: i64,
    pub word: String,
    pub reading: String,
    pub text: String,
    pub core_index: String,
    pub optimized_index: String,
    pub audio: String,
    pub furigana: String,
    pub sentence_main: String,
    pub sentence_reading: String,
    pub sentence_text: String,
    pub sentence_audio: String,
}

impl CuratedEntry {
    pub fn from_note(note: &NoteInfo) -> Self {
        Self {
            note_id: note.note_id,
            word: note.field("Vocabulary-Kanji").to_string(),
            reading: note.field("Vocabulary-Kana").to_string(),
            text: note.field("Vocabulary-English").to_string(),
            core_index: note.field("Core-Index").to_string(),
            optimized_index: note.field("Optimized-Voc-Index").to_string(),
            audio: note.field("Vocabulary-Audio").to_string(),
            furigana: note.field("Vocabulary-Furigana").to_string(),
            sentence_main: note.field("Expression").to_string(),
            sentence_reading: note.field("Reading").to_string(),
            sentence_text: note.field("Sentence-English").to_string(),
            sentence_audio: note.field("Sentence-Audio").to_string(),
        }
    }
}

/// Reader over both source decks.
pub struct SourceDecks<'a> {
    client: &'a AnkiClient,
    config: &'a GoiConfig,
}

impl<'a> SourceDecks<'a> {
    pub fn new(client: &'a AnkiClient, config: &'a GoiConfig) -> Self {
        Self { client, config }
    }

    /// Scraper-deck entries, optionally narrowed by word/reading keywords
    /// and to not-yet-synchronized notes.
    pub async fn scraper_entries(
        &self,
        word: Option<&str>,
        reading: Option<&str>,
        only_new: bool,
    ) -> Result<Vec<ScraperEntry>> {
        let mut query = NoteQuery {
            deck: Some(self.config.scraper_deck.clone()),
            ..Default::default()
        };
        if let Some(word) = word {
            query.keywords.push(word.to_string());
        }
        if let Some(reading) = reading {
            query.keywords.push(reading.to_string());
        }
        if only_new {
            query.tags.push(SCRAPER_NEW_TAG.to_string());
        }

        let notes = self.client.query_notes(&query).await?;
        let entries = notes
            .iter()
            .map(ScraperEntry::from_note)
            .filter(|entry| matches_exactly(&entry.word, &entry.reading, word, reading))
            .collect();
        Ok(entries)
    }

    /// Curated-deck entries for one word, optionally narrowed to an exact
    /// reading.
    pub async fn curated_entries(
        &self,
        word: &str,
        reading: Option<&str>,
    ) -> Result<Vec<CuratedEntry>> {
        let query = NoteQuery {
            deck: Some(self.config.curated_deck.clone()),
            keywords: vec![word.to_string()],
            ..Default::default()
        };

        let notes = self.client.query_notes(&query).await?;
        let entries = notes
            .iter()
            .map(CuratedEntry::from_note)
            .filter(|entry| matches_exactly(&entry.word, &entry.reading, Some(word), reading))
            .collect();
        Ok(entries)
    }
}

/// Keyword search is substring-based; narrow to exact word/reading
/// matches when either was requested.
fn matches_exactly(
    word: &str,
    reading: &str,
    want_word: Option<&str>,
    want_reading: Option<&str>,
) -> bool {
    if want_word.is_some_and(|w| word != w) {
        return false;
    }
    if want_reading.is_some_and(|r| reading != r) {
        return false;
    }
    true
}

/// Split a scraper tag listing on commas, dropping dictionary-source
/// noise markers.
fn split_entry_tags(listing: &str) -> Vec<String> {
    listing
        .split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty() && !tags::noise_pattern().is_match(tag))
        .map(|tag| tag.to_string())
        .collect()
}
