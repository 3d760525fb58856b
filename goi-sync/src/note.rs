//! Entry assembler
//!
//! Combines one scraper-deck entry with its optional curated-deck
//! counterpart and the reference tables into the fixed field set of the
//! sync model, then upserts the result into the card store. The field
//! set is closed, so this is an explicit struct rather than an open map.

use std::collections::HashMap;

use goi_common::anki::{AnkiClient, NoteQuery};
use goi_common::Result;
use quick_xml::escape::escape;

use crate::furigana::render_furigana;
use crate::glossary;
use crate::kanji::KanjiBank;
use crate::model;
use crate::normalize::{clean_sentence, extract_frequency};
use crate::radicals::{self, RadicalSegment};
use crate::sources::{CuratedEntry, ScraperEntry};
use crate::tags::TagRegistry;

/// Assembled field content for one note. Optional fields render as empty
/// strings in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    pub key: String,
    pub expression: String,
    pub expression_alt: Option<String>,
    pub reading: String,
    pub furigana: String,
    pub frequency: Option<String>,
    pub audio: Option<String>,
    pub radicals: Option<String>,
    pub notes: Option<String>,
    pub kanji: Option<String>,
    pub glossary: String,
    pub image: Option<String>,
    pub example_main: Option<String>,
    pub example_text: Option<String>,
    pub example_read: Option<String>,
    pub example_audio: Option<String>,
    pub example_image: Option<String>,
    pub scraper_id: Option<String>,
    pub scraper_audio: Option<String>,
    pub scraper_glossary: Option<String>,
    pub scraper_sentence: Option<String>,
    pub curated_id: Option<String>,
    pub curated_index: Option<String>,
    pub curated_order: Option<String>,
    pub curated_audio: Option<String>,
    pub curated_sentence_read: Option<String>,
}

impl NoteFields {
    /// Field name → content for the store, one entry per model field.
    pub fn to_field_map(&self) -> HashMap<String, String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let mut fields = HashMap::new();
        fields.insert("key".to_string(), self.key.clone());
        fields.insert("expression".to_string(), self.expression.clone());
        fields.insert("expression-alt".to_string(), opt(&self.expression_alt));
        fields.insert("reading".to_string(), self.reading.clone());
        fields.insert("furigana".to_string(), self.furigana.clone());
        fields.insert("frequency".to_string(), opt(&self.frequency));
        fields.insert("audio".to_string(), opt(&self.audio));
        fields.insert("radicals".to_string(), opt(&self.radicals));
        fields.insert("notes".to_string(), opt(&self.notes));
        fields.insert("kanji".to_string(), opt(&self.kanji));
        fields.insert("glossary".to_string(), self.glossary.clone());
        fields.insert("image".to_string(), opt(&self.image));
        fields.insert("example-main".to_string(), opt(&self.example_main));
        fields.insert("example-text".to_string(), opt(&self.example_text));
        fields.insert("example-read".to_string(), opt(&self.example_read));
        fields.insert("example-audio".to_string(), opt(&self.example_audio));
        fields.insert("example-image".to_string(), opt(&self.example_image));
        fields.insert("scraper-id".to_string(), opt(&self.scraper_id));
        fields.insert("scraper-audio".to_string(), opt(&self.scraper_audio));
        fields.insert("scraper-glossary".to_string(), opt(&self.scraper_glossary));
        fields.insert("scraper-sentence".to_string(), opt(&self.scraper_sentence));
        fields.insert("curated-id".to_string(), opt(&self.curated_id));
        fields.insert("curated-index".to_string(), opt(&self.curated_index));
        fields.insert("curated-order".to_string(), opt(&self.curated_order));
        fields.insert("curated-audio".to_string(), opt(&self.curated_audio));
        fields.insert(
            "curated-sentence-read".to_string(),
            opt(&self.curated_sentence_read),
        );
        fields
    }
}

/// Build the note fields for one entry.
pub fn assemble_note(
    scraper: &ScraperEntry,
    curated: Option<&CuratedEntry>,
    registry: &TagRegistry,
    bank: &KanjiBank,
) -> NoteFields {
    let furigana = if scraper.furigana_text.is_empty() {
        scraper.word.clone()
    } else {
        render_furigana(&scraper.furigana_text)
    };

    let expression_alt = curated
        .filter(|c| !c.word.is_empty() && c.word != scraper.word)
        .map(|c| c.word.clone());

    let non_empty = |s: &str| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    };

    NoteFields {
        key: scraper.key.clone(),
        expression: scraper.word.clone(),
        expression_alt,
        reading: scraper.reading.clone(),
        furigana,
        frequency: non_empty(&extract_frequency(&scraper.frequency)),
        audio: curated.and_then(|c| non_empty(&c.audio)),
        radicals: non_empty(&render_radicals(&scraper.word)),
        notes: None,
        kanji: non_empty(&render_kanji_breakdown(&scraper.word, bank)),
        glossary: glossary::render_glossary(&scraper.glossary, registry),
        image: None,
        example_main: curated.and_then(|c| non_empty(&c.sentence_main)),
        example_text: curated.and_then(|c| non_empty(&c.sentence_text)),
        example_read: curated
            .filter(|c| !c.sentence_reading.is_empty())
            .map(|c| render_furigana(&c.sentence_reading)),
        example_audio: curated.and_then(|c| non_empty(&c.sentence_audio)),
        example_image: None,
        scraper_id: Some(scraper.note_id.to_string()),
        scraper_audio: None,
        scraper_glossary: non_empty(&scraper.glossary),
        scraper_sentence: non_empty(&clean_sentence(&scraper.sentence)),
        curated_id: curated.map(|c| c.note_id.to_string()),
        curated_index: curated.and_then(|c| non_empty(&c.core_index)),
        curated_order: curated.and_then(|c| non_empty(&c.optimized_index)),
        curated_audio: curated.and_then(|c| non_empty(&c.sentence_audio)),
        curated_sentence_read: curated.and_then(|c| non_empty(&c.sentence_reading)),
    }
}

/// Annotate known radical glyphs in `text`. Empty unless at least one
/// character is a known radical.
fn render_radicals(text: &str) -> String {
    let segments = radicals::annotate(text);
    if !segments
        .iter()
        .any(|s| matches!(s, RadicalSegment::Radical(_)))
    {
        return String::new();
    }

    segments
        .iter()
        .map(|segment| match segment {
            RadicalSegment::Radical(r) => format!(
                "<span class=\"radical\" title=\"{}\">{}</span>",
                escape(r.meaning.as_str()),
                escape(r.radical.as_str())
            ),
            RadicalSegment::Raw(s) => escape(s.as_str()).into_owned(),
        })
        .collect()
}

/// Per-character kanji breakdown markup, one line per known kanji.
fn render_kanji_breakdown(text: &str, bank: &KanjiBank) -> String {
    bank.list(text)
        .iter()
        .map(|info| {
            let readings: Vec<&str> = info
                .on
                .iter()
                .chain(info.kun.iter())
                .map(|s| s.as_str())
                .collect();
            format!(
                "<div class=\"kanji-entry\"><span class=\"kanji\">{}</span> <span class=\"kanji-readings\">{}</span> {}</div>",
                escape(info.kanji.as_str()),
                escape(&readings.join("・")),
                escape(&info.meanings.join(", "))
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Result of one note upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Added(i64),
    Updated(i64),
    /// The store rejected the add (typically a duplicate-key race)
    Skipped,
}

/// Create or update the note for `fields.key` in `deck`.
pub async fn upsert_note(
    client: &AnkiClient,
    deck: &str,
    fields: &NoteFields,
) -> Result<UpsertOutcome> {
    let query = NoteQuery {
        deck: Some(deck.to_string()),
        predicates: vec![format!("\"key:{}\"", fields.key)],
        ..Default::default()
    };
    let existing = client.find_notes(&query).await?;
    let field_map = fields.to_field_map();

    match existing.first() {
        None => {
            let added = client
                .add_note(deck, &model::model_name(deck), &field_map, model::NEW_NOTE_TAGS)
                .await?;
            match added {
                Some(id) => {
                    tracing::info!(key = %fields.key, id, "Added note");
                    Ok(UpsertOutcome::Added(id))
                }
                None => {
                    tracing::warn!(key = %fields.key, "Could not add note");
                    Ok(UpsertOutcome::Skipped)
                }
            }
        }
        Some(&id) => {
            client.update_note_fields(id, &field_map).await?;
            tracing::info!(key = %fields.key, id, "Updated note");
            Ok(UpsertOutcome::Updated(id))
        }
    }
}
