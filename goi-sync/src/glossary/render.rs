//! Canonical tree renderer
//!
//! Serializes a [`MergedNode`] back to markup. Short flat glossaries read
//! better as one line, so a node whose entries are all short plain strings
//! renders inline; anything longer or nested renders as a list, ordered at
//! the root and unordered below it.

use quick_xml::escape::escape;

use super::merge::{Entry, MergedNode};
use crate::tags::TagRegistry;

/// Entries at or above this length (in characters) force list rendering.
const INLINE_THRESHOLD: usize = 20;

/// Render a canonical node to markup. Pass `is_root = true` for the
/// top-level call; recursion always descends with `is_root = false`.
pub fn render(node: &MergedNode, registry: &TagRegistry, is_root: bool) -> String {
    let tag_span = render_tag_span(&node.tags, registry);

    if is_simple(node) {
        let texts: Vec<String> = node
            .text
            .iter()
            .filter_map(|entry| match entry {
                Entry::Text(s) => Some(escape(s.as_str()).into_owned()),
                Entry::Node(_) => None,
            })
            .collect();
        return format!("{}{}", texts.join(", "), tag_span);
    }

    let list_tag = if is_root { "ol" } else { "ul" };
    let mut out = format!("<{}>", list_tag);
    for (index, entry) in node.text.iter().enumerate() {
        let content = match entry {
            Entry::Text(s) => escape(s.as_str()).into_owned(),
            Entry::Node(nested) => render(nested, registry, false),
        };
        out.push_str("<li>");
        out.push_str(&content);
        if index == 0 {
            out.push_str(&tag_span);
        }
        out.push_str("</li>");
    }
    out.push_str(&format!("</{}>", list_tag));
    out
}

/// A node is simple when every text entry is a plain string under the
/// inline threshold.
fn is_simple(node: &MergedNode) -> bool {
    node.text.iter().all(|entry| match entry {
        Entry::Text(s) => s.chars().count() < INLINE_THRESHOLD,
        Entry::Node(_) => false,
    })
}

/// Render tag annotations as one inline italic span, ordered by
/// `(order, name)`. Tags with a description get it as a hover annotation.
fn render_tag_span(tags: &[String], registry: &TagRegistry) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let mut infos: Vec<_> = tags.iter().map(|name| registry.lookup(name)).collect();
    infos.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));

    let labels: Vec<String> = infos
        .iter()
        .map(|info| {
            let name = escape(info.name.as_str());
            if info.description.is_empty() {
                name.into_owned()
            } else {
                format!(
                    "<span title=\"{}\">{}</span>",
                    escape(info.description.as_str()),
                    name
                )
            }
        })
        .collect();

    format!("<em>{}</em>", labels.join(", "))
}
