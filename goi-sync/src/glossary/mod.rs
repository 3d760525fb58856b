//! Glossary canonicalization pipeline
//!
//! Dictionary-scraper glossary markup redundantly repeats near-identical
//! tag groupings and phrasings across nested list levels. This module
//! parses the markup into a raw tree, collapses structurally-equivalent
//! siblings into a canonical tree, and renders the result back to compact
//! markup:
//!
//! raw markup → [`parser`] → `RawNode` → [`merge`] → `MergedNode` →
//! [`render`] → output markup
//!
//! The whole pipeline is pure and allocation-local; every call is
//! independent given the same input and tag registry.

pub mod merge;
pub mod parser;
pub mod render;

pub use merge::{merge, Entry, MergedNode};
pub use parser::{parse_fragment, RawNode};
pub use render::render;

use crate::tags::TagRegistry;

/// Canonicalize one glossary fragment end to end.
///
/// Empty or contentless input yields an empty string.
pub fn render_glossary(markup: &str, registry: &TagRegistry) -> String {
    parse_fragment(markup)
        .and_then(merge)
        .map(|node| render(&node, registry, true))
        .unwrap_or_default()
}
