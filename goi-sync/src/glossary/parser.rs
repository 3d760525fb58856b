//! Glossary markup parser
//!
//! Parses the restricted HTML subset used by scraper glossaries (lists,
//! italic tag annotations, plain text, generic wrapping elements) into a
//! [`RawNode`] tree. Malformed input degrades to fewer or empty nodes and
//! never fails.

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::tags;

/// Raw annotated tree produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawNode {
    /// Free-standing text content, already trimmed and non-empty
    Text(String),
    /// Annotation-only node from an italic span, e.g. `(n, vt)`
    Tags(Vec<String>),
    /// Ordered children of a list or wrapping element, never empty
    Branch(Vec<RawNode>),
}

/// Closed element vocabulary of the markup subset.
///
/// Anything not in the listed vocabulary is a `Container` and is unwrapped
/// rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    List,
    Item,
    Annotation,
    Container,
}

fn classify(local_name: &[u8]) -> ElementKind {
    match local_name.to_ascii_lowercase().as_slice() {
        b"ol" | b"ul" => ElementKind::List,
        b"li" => ElementKind::Item,
        b"i" | b"em" => ElementKind::Annotation,
        _ => ElementKind::Container,
    }
}

struct Frame {
    kind: ElementKind,
    children: Vec<RawNode>,
}

/// Parse a glossary fragment using the default noise-tag filter.
pub fn parse_fragment(markup: &str) -> Option<RawNode> {
    parse_fragment_with(markup, tags::noise_pattern())
}

/// Parse a glossary fragment, filtering annotation tags that match
/// `ignore`.
pub fn parse_fragment_with(markup: &str, ignore: &Regex) -> Option<RawNode> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut roots: Vec<RawNode> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(Frame {
                    kind: classify(e.local_name().as_ref()),
                    children: Vec::new(),
                });
            }
            Ok(Event::End(_)) => {
                let Some(frame) = stack.pop() else {
                    continue;
                };
                if let Some(node) = fold_frame(frame, ignore) {
                    push_child(&mut stack, &mut roots, node);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                push_text(&mut stack, &mut roots, &text);
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t).into_owned();
                push_text(&mut stack, &mut roots, &text);
            }
            // Empty elements (<br/>, <img/>) carry no glossary content
            Ok(Event::Empty(_)) => {}
            Ok(Event::Eof) => break,
            Ok(_) => {}
            // Malformed markup: keep whatever parsed so far
            Err(_) => break,
        }
    }

    // Unclosed elements at end of input fold as if closed
    while let Some(frame) = stack.pop() {
        if let Some(node) = fold_frame(frame, ignore) {
            push_child(&mut stack, &mut roots, node);
        }
    }

    match roots.len() {
        0 => None,
        1 => roots.pop(),
        _ => Some(RawNode::Branch(roots)),
    }
}

fn push_text(stack: &mut Vec<Frame>, roots: &mut Vec<RawNode>, text: &str) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    push_child(stack, roots, RawNode::Text(trimmed.to_string()));
}

fn push_child(stack: &mut Vec<Frame>, roots: &mut Vec<RawNode>, node: RawNode) {
    match stack.last_mut() {
        Some(frame) => frame.children.push(node),
        None => roots.push(node),
    }
}

/// Reduce a closed element to its node, or nothing if structurally empty.
fn fold_frame(frame: Frame, ignore: &Regex) -> Option<RawNode> {
    match frame.kind {
        ElementKind::Annotation => {
            let mut text = String::new();
            collect_text(&frame.children, &mut text);
            let tags = parse_tag_list(&text, ignore);
            if tags.is_empty() {
                None
            } else {
                Some(RawNode::Tags(tags))
            }
        }
        ElementKind::List | ElementKind::Item | ElementKind::Container => {
            if frame.children.is_empty() {
                None
            } else {
                Some(RawNode::Branch(frame.children))
            }
        }
    }
}

fn collect_text(nodes: &[RawNode], out: &mut String) {
    for node in nodes {
        match node {
            RawNode::Text(s) => out.push_str(s),
            RawNode::Tags(_) => {}
            RawNode::Branch(children) => collect_text(children, out),
        }
    }
}

/// Interpret annotation text as a comma-separated, optionally
/// parenthesis-wrapped tag listing.
fn parse_tag_list(text: &str, ignore: &Regex) -> Vec<String> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('(').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(')').unwrap_or(trimmed);

    let mut tags: Vec<String> = Vec::new();
    for part in trimmed.split(',') {
        let name = part.trim();
        if name.is_empty() || ignore.is_match(name) {
            continue;
        }
        if !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_becomes_a_leaf() {
        assert_eq!(
            parse_fragment("  to eat  "),
            Some(RawNode::Text("to eat".to_string()))
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(parse_fragment(""), None);
        assert_eq!(parse_fragment("   \n\t  "), None);
        assert_eq!(parse_fragment("<div></div>"), None);
        assert_eq!(parse_fragment("<ul><li>  </li></ul>"), None);
    }

    #[test]
    fn list_becomes_a_branch() {
        let parsed = parse_fragment("<ol><li>to eat</li><li>to live on</li></ol>");
        assert_eq!(
            parsed,
            Some(RawNode::Branch(vec![
                RawNode::Branch(vec![RawNode::Text("to eat".to_string())]),
                RawNode::Branch(vec![RawNode::Text("to live on".to_string())]),
            ]))
        );
    }

    #[test]
    fn italic_becomes_a_tag_leaf() {
        assert_eq!(
            parse_fragment("<i>(n, vt)</i>"),
            Some(RawNode::Tags(vec!["n".to_string(), "vt".to_string()]))
        );
        // without parentheses
        assert_eq!(
            parse_fragment("<em>n, vt</em>"),
            Some(RawNode::Tags(vec!["n".to_string(), "vt".to_string()]))
        );
    }

    #[test]
    fn annotation_tags_are_deduplicated() {
        assert_eq!(
            parse_fragment("<i>(n, n, vt)</i>"),
            Some(RawNode::Tags(vec!["n".to_string(), "vt".to_string()]))
        );
    }

    #[test]
    fn noise_tags_are_filtered() {
        assert_eq!(
            parse_fragment("<i>(v1, JMdict, vt)</i>"),
            Some(RawNode::Tags(vec!["v1".to_string(), "vt".to_string()]))
        );
        // case-insensitive, and an annotation of only noise disappears
        assert_eq!(parse_fragment("<i>(jmdict, KireiCake)</i>"), None);
    }

    #[test]
    fn unknown_elements_unwrap() {
        let parsed = parse_fragment("<div><span>to eat</span><i>(v1)</i></div>");
        assert_eq!(
            parsed,
            Some(RawNode::Branch(vec![
                RawNode::Branch(vec![RawNode::Text("to eat".to_string())]),
                RawNode::Tags(vec!["v1".to_string()]),
            ]))
        );
    }

    #[test]
    fn entities_are_unescaped() {
        assert_eq!(
            parse_fragment("fish &amp; chips"),
            Some(RawNode::Text("fish & chips".to_string()))
        );
    }

    #[test]
    fn malformed_markup_degrades() {
        // unclosed elements fold as if closed
        let parsed = parse_fragment("<ul><li>to eat");
        assert_eq!(
            parsed,
            Some(RawNode::Branch(vec![RawNode::Branch(vec![RawNode::Text(
                "to eat".to_string()
            )])]))
        );
        // stray end tags are ignored
        assert_eq!(
            parse_fragment("</li>to eat</ul>"),
            Some(RawNode::Text("to eat".to_string()))
        );
    }

    #[test]
    fn nested_markup_inside_annotation_contributes_text() {
        assert_eq!(
            parse_fragment("<i>(<b>n</b>, vt)</i>"),
            Some(RawNode::Tags(vec!["n".to_string(), "vt".to_string()]))
        );
    }

    #[test]
    fn multiple_roots_become_a_branch() {
        let parsed = parse_fragment("to eat<i>(v1)</i>");
        assert_eq!(
            parsed,
            Some(RawNode::Branch(vec![
                RawNode::Text("to eat".to_string()),
                RawNode::Tags(vec!["v1".to_string()]),
            ]))
        );
    }
}
