//! Kanji reference bank
//!
//! Read-only lookup over scraper-format kanji bank dumps: character
//! records (`[kanji, on, kun, tags, meanings, stats]`) and a kanji tag
//! table (`[tag, kind, score, description]`). Loaded once from the data
//! directory; missing or unreadable bank files degrade to an empty bank
//! with a warning rather than failing the sync.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
struct KanjiRow(String, String, String, String, Vec<String>, Value);

#[derive(Debug, Clone, Deserialize)]
struct KanjiTagRow(String, String, i64, String);

/// One kanji record.
#[derive(Debug, Clone)]
pub struct KanjiInfo {
    pub kanji: String,
    pub meanings: Vec<String>,
    pub on: Vec<String>,
    pub kun: Vec<String>,
    pub tags: Vec<String>,
    pub stats: Value,
}

/// Metadata for one kanji tag.
#[derive(Debug, Clone)]
pub struct KanjiTag {
    pub name: String,
    pub kind: String,
    pub score: i64,
    pub description: String,
}

/// Immutable kanji → record table plus its tag table.
#[derive(Debug, Default)]
pub struct KanjiBank {
    kanji: HashMap<char, KanjiInfo>,
    tags: HashMap<String, KanjiTag>,
}

impl KanjiBank {
    /// Load every `kanji_bank_*.json` and `tag_bank_*.json` under `dir`.
    ///
    /// A missing directory or unreadable file is logged and skipped; the
    /// result is then simply a smaller (possibly empty) bank.
    pub fn load(dir: &Path) -> Self {
        let mut bank = Self::default();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "kanji data directory unavailable, continuing with an empty bank");
                return bank;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with("kanji_bank") && name.ends_with(".json") {
                bank.load_kanji_file(&path);
            } else if name.starts_with("tag_bank") && name.ends_with(".json") {
                bank.load_tag_file(&path);
            }
        }

        tracing::debug!(
            kanji = bank.kanji.len(),
            tags = bank.tags.len(),
            "kanji bank loaded"
        );
        bank
    }

    fn load_kanji_file(&mut self, path: &Path) {
        let rows: Vec<KanjiRow> = match read_rows(path) {
            Some(rows) => rows,
            None => return,
        };
        for KanjiRow(kanji, on, kun, tags, meanings, stats) in rows {
            let Some(key) = kanji.chars().next() else {
                continue;
            };
            self.kanji.insert(
                key,
                KanjiInfo {
                    kanji,
                    meanings,
                    on: split_listing(&on),
                    kun: split_listing(&kun),
                    tags: split_listing(&tags),
                    stats,
                },
            );
        }
    }

    fn load_tag_file(&mut self, path: &Path) {
        let rows: Vec<KanjiTagRow> = match read_rows(path) {
            Some(rows) => rows,
            None => return,
        };
        for KanjiTagRow(name, kind, score, description) in rows {
            self.tags.insert(
                name.clone(),
                KanjiTag {
                    name,
                    kind,
                    score,
                    description,
                },
            );
        }
    }

    /// Record for one character, if the bank knows it.
    pub fn get(&self, kanji: char) -> Option<&KanjiInfo> {
        self.kanji.get(&kanji)
    }

    /// Kanji tag by name; unknown names yield a bare default record.
    pub fn get_tag(&self, name: &str) -> KanjiTag {
        self.tags.get(name).cloned().unwrap_or_else(|| KanjiTag {
            name: name.to_string(),
            kind: String::new(),
            score: 0,
            description: String::new(),
        })
    }

    /// Known-kanji records for every distinct character of `text`, in
    /// first-occurrence order.
    pub fn list(&self, text: &str) -> Vec<&KanjiInfo> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for c in text.chars() {
            if !seen.insert(c) {
                continue;
            }
            if let Some(info) = self.kanji.get(&c) {
                out.push(info);
            }
        }
        out
    }

    /// Number of known kanji.
    pub fn len(&self) -> usize {
        self.kanji.len()
    }

    /// Whether the bank holds no kanji.
    pub fn is_empty(&self) -> bool {
        self.kanji.is_empty()
    }
}

fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Option<Vec<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable bank file");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(rows) => Some(rows),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping malformed bank file");
            None
        }
    }
}

/// Split a bank listing on commas, semicolons, and whitespace.
fn split_listing(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}
