//! Tree merge engine
//!
//! Collapses a [`RawNode`] tree into a minimal canonical tree by merging
//! structurally-equivalent siblings. Scraper glossaries repeat
//! near-identical tag groupings and phrasings across nested list levels;
//! this pass keeps every distinct (tag set, text set) pairing exactly once
//! while preserving nesting for genuinely distinct senses.
//!
//! The coalescing scan order is load-bearing: the outer walk moves from
//! the last sibling backward, and each sibling merges into the first
//! compatible earlier sibling found scanning from its left neighbor down
//! to index 0. Rendering order downstream depends on this exact
//! tie-break; do not replace it with a global-minimum merge.

use super::parser::RawNode;

/// One entry of a merged node's text sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Plain definition text
    Text(String),
    /// A nested sense that could not be absorbed
    Node(MergedNode),
}

/// Canonical glossary node.
///
/// `tags` preserves insertion order and never holds duplicates; `text`
/// never holds two equal entries. A node is a scalar definition when all
/// entries are [`Entry::Text`], and a composite when entries nest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedNode {
    pub tags: Vec<String>,
    pub text: Vec<Entry>,
}

impl MergedNode {
    /// Whether every text entry is a plain string.
    pub fn is_scalar(&self) -> bool {
        self.text.iter().all(|e| matches!(e, Entry::Text(_)))
    }
}

/// Reduce a raw tree to its canonical form, or `None` when no meaningful
/// content remains.
pub fn merge(node: RawNode) -> Option<MergedNode> {
    match node {
        RawNode::Text(text) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(MergedNode {
                    tags: Vec::new(),
                    text: vec![Entry::Text(text)],
                })
            }
        }
        RawNode::Tags(tags) => {
            let mut deduped: Vec<String> = Vec::new();
            for tag in tags {
                push_unique_tag(&mut deduped, tag);
            }
            if deduped.is_empty() {
                None
            } else {
                Some(MergedNode {
                    tags: deduped,
                    text: Vec::new(),
                })
            }
        }
        RawNode::Branch(children) => {
            let mut survivors: Vec<MergedNode> =
                children.into_iter().filter_map(merge).collect();
            match survivors.len() {
                0 => None,
                // single-child collapse: wrapping containers disappear
                1 => survivors.pop(),
                _ => Some(coalesce(survivors)),
            }
        }
    }
}

/// Merge a set of sibling nodes (at least two) into one canonical node.
fn coalesce(survivors: Vec<MergedNode>) -> MergedNode {
    // Classification: nodes that are purely textual or purely tag-only
    // pool into one accumulator; nodes carrying both tags and text stay
    // distinct entries.
    let mut pooled_tags: Vec<String> = Vec::new();
    let mut pooled_text: Vec<Entry> = Vec::new();
    let mut entries: Vec<MergedNode> = Vec::new();

    for node in survivors {
        if node.tags.is_empty() || node.text.is_empty() {
            for tag in node.tags {
                push_unique_tag(&mut pooled_tags, tag);
            }
            for entry in node.text {
                push_unique_entry(&mut pooled_text, entry);
            }
        } else {
            entries.push(node);
        }
    }

    if !pooled_tags.is_empty() || !pooled_text.is_empty() {
        entries.insert(
            0,
            MergedNode {
                tags: pooled_tags,
                text: pooled_text,
            },
        );
    }

    // Coalescing: one backward pass. Each src merges into at most one
    // earlier dst (the first compatible, scanning src-1 down to 0) and is
    // spliced out; indices below src are unaffected by the removal.
    let mut src = entries.len();
    while src > 1 {
        src -= 1;
        let dst = (0..src)
            .rev()
            .find(|&dst| compatible(&entries[dst], &entries[src]));
        if let Some(dst) = dst {
            let absorbed = entries.remove(src);
            for tag in absorbed.tags {
                push_unique_tag(&mut entries[dst].tags, tag);
            }
            for entry in absorbed.text {
                push_unique_entry(&mut entries[dst].text, entry);
            }
        }
    }

    if entries.len() == 1 {
        return entries.pop().expect("one surviving node");
    }
    MergedNode {
        tags: Vec::new(),
        text: entries.into_iter().map(Entry::Node).collect(),
    }
}

/// Two siblings merge when their tag sets are compatible (both empty, or
/// one a subset of the other) or their text sets are (one a subset of the
/// other).
fn compatible(a: &MergedNode, b: &MergedNode) -> bool {
    let tags_compatible = (a.tags.is_empty() && b.tags.is_empty())
        || is_tag_subset(&a.tags, &b.tags)
        || is_tag_subset(&b.tags, &a.tags);
    let text_compatible =
        is_text_subset(&a.text, &b.text) || is_text_subset(&b.text, &a.text);
    tags_compatible || text_compatible
}

fn is_tag_subset(small: &[String], large: &[String]) -> bool {
    small.iter().all(|tag| large.contains(tag))
}

fn is_text_subset(small: &[Entry], large: &[Entry]) -> bool {
    small.iter().all(|entry| large.contains(entry))
}

fn push_unique_tag(tags: &mut Vec<String>, tag: String) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

fn push_unique_entry(entries: &mut Vec<Entry>, entry: Entry) {
    if !entries.contains(&entry) {
        entries.push(entry);
    }
}
