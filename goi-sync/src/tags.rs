//! Tag registry
//!
//! Read-only lookup from a tag name to its category, sort order, and
//! description. Loaded once from the embedded JMdict/JMnedict tag tables
//! and shared for the lifetime of the process. Lookups never fail: an
//! unknown name yields a default record carrying the name itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

/// Dictionary-source markers that carry no meaning for the card and are
/// filtered out of annotations at parse time.
static NOISE_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)JMnedict|JMdict|KireiCake").expect("noise tag pattern"));

/// Pattern matching ignorable dictionary-source tags.
pub fn noise_pattern() -> &'static Regex {
    &NOISE_TAGS
}

/// One row of a tag table: `[name, category, order, description, score]`.
#[derive(Debug, Clone, Deserialize)]
struct TagRow(String, String, i64, String, i64);

/// Metadata for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Name for the tag, as it appears on entries
    pub name: String,
    /// General category grouping related tags
    pub category: String,
    /// Sorting term for tags on an entry
    pub order: i64,
    /// Description for the tag
    pub description: String,
    /// Score for terms with this tag; higher scores sort terms first
    pub score: i64,
}

/// Immutable name → [`TagInfo`] table.
pub struct TagRegistry {
    map: HashMap<String, TagInfo>,
}

static SHARED: Lazy<TagRegistry> = Lazy::new(TagRegistry::embedded);

impl TagRegistry {
    /// Registry over the embedded JMdict and JMnedict tag tables.
    pub fn embedded() -> Self {
        Self::from_tables(&[
            include_str!("../assets/tags_jmdict.json"),
            include_str!("../assets/tags_jmnedict.json"),
        ])
    }

    /// Process-wide shared registry, loaded on first use.
    pub fn shared() -> &'static TagRegistry {
        &SHARED
    }

    fn from_tables(tables: &[&str]) -> Self {
        let mut map = HashMap::new();
        for table in tables {
            let rows: Vec<TagRow> =
                serde_json::from_str(table).expect("embedded tag table is well-formed");
            for TagRow(name, category, order, description, score) in rows {
                map.insert(
                    name.clone(),
                    TagInfo {
                        name,
                        category,
                        order,
                        description,
                        score,
                    },
                );
            }
        }
        Self { map }
    }

    /// Look up a tag by name. Unknown names yield a default record with
    /// the queried name, order 0, and empty category/description.
    pub fn lookup(&self, name: &str) -> TagInfo {
        self.map.get(name).cloned().unwrap_or_else(|| TagInfo {
            name: name.to_string(),
            category: String::new(),
            order: 0,
            description: String::new(),
            score: 0,
        })
    }

    /// Number of known tags.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the registry holds no tags.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
