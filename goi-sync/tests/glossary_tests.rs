//! End-to-end tests for the glossary canonicalization pipeline

use goi_sync::glossary::{merge, parse_fragment, render_glossary};
use goi_sync::tags::TagRegistry;

fn canonicalize(markup: &str) -> String {
    render_glossary(markup, TagRegistry::shared())
}

#[test]
fn empty_input_renders_empty() {
    assert_eq!(canonicalize(""), "");
    assert_eq!(canonicalize("   \n\t "), "");
    assert_eq!(canonicalize("<div><ul><li> </li></ul></div>"), "");
}

#[test]
fn single_definition_renders_inline() {
    assert_eq!(canonicalize("to eat"), "to eat");
    assert_eq!(
        canonicalize("<div>to eat<i>(v1)</i></div>"),
        "to eat<em><span title=\"Ichidan verb\">v1</span></em>"
    );
}

#[test]
fn single_child_wrappers_collapse_at_any_depth() {
    let expected = canonicalize("to eat");
    assert_eq!(canonicalize("<div>to eat</div>"), expected);
    assert_eq!(canonicalize("<div><span>to eat</span></div>"), expected);
    assert_eq!(
        canonicalize("<div><span><ul><li>to eat</li></ul></span></div>"),
        expected
    );
}

#[test]
fn duplicate_tags_never_survive() {
    let markup = "<div><i>(n, vt)</i>meal<i>(vt, n)</i></div>";
    let merged = merge(parse_fragment(markup).unwrap()).unwrap();
    let mut seen = std::collections::HashSet::new();
    for tag in &merged.tags {
        assert!(seen.insert(tag.clone()), "duplicate tag {}", tag);
    }
    assert_eq!(merged.tags, vec!["n".to_string(), "vt".to_string()]);
}

#[test]
fn subset_tag_sets_collapse_to_the_superset() {
    let markup = concat!(
        "<ol>",
        "<li>profit<i>(n)</i></li>",
        "<li>profit<i>(n, vt)</i></li>",
        "</ol>",
    );
    let merged = merge(parse_fragment(markup).unwrap()).unwrap();
    assert_eq!(merged.tags, vec!["n".to_string(), "vt".to_string()]);
    let rendered = canonicalize(markup);
    // one merged sense, rendered inline
    assert!(!rendered.contains("<ol>"));
    assert!(rendered.starts_with("profit<em>"));
}

#[test]
fn noise_markers_never_reach_the_output() {
    let markup = "<div>to eat<i>(v1, JMdict (English))</i></div>";
    let rendered = canonicalize(markup);
    assert!(!rendered.contains("JMdict"));
    assert!(rendered.contains("v1"));
}

#[test]
fn short_entries_render_without_list_markup() {
    let markup = "<ul><li>to eat</li><li>to consume</li></ul>";
    let rendered = canonicalize(markup);
    assert_eq!(rendered, "to eat, to consume");
    for token in ["<ul>", "<ol>", "<li>"] {
        assert!(!rendered.contains(token));
    }
}

#[test]
fn a_long_entry_forces_list_rendering() {
    let markup = concat!(
        "<ul>",
        "<li>short</li>",
        "<li>a definition well over twenty characters long</li>",
        "</ul>",
    );
    let rendered = canonicalize(markup);
    assert_eq!(
        rendered,
        "<ol><li>short</li><li>a definition well over twenty characters long</li></ol>"
    );
}

#[test]
fn inline_threshold_boundary() {
    // 19 characters stays inline, 20 goes to a list
    let nineteen = "a".repeat(19);
    let twenty = "a".repeat(20);
    assert_eq!(canonicalize(&nineteen), nineteen);
    assert_eq!(canonicalize(&twenty), format!("<ol><li>{}</li></ol>", twenty));
}

#[test]
fn end_to_end_two_senses() {
    // two definitions sharing a tag set, plus a nested formal sense
    let markup = concat!(
        "<ol>",
        "<li>to eat<i>(v1)</i></li>",
        "<li>to consume<i>(v1)</i></li>",
        "<li><div>to dine<i>(formal)</i></div></li>",
        "</ol>",
    );
    let rendered = canonicalize(markup);
    assert_eq!(
        rendered,
        concat!(
            "<ol>",
            "<li>to eat, to consume<em><span title=\"Ichidan verb\">v1</span></em></li>",
            "<li>to dine<em>formal</em></li>",
            "</ol>",
        )
    );
}

#[test]
fn canonical_output_is_a_fixed_point() {
    // re-parsing and re-merging a canonical rendering must not change it
    let inputs = [
        "to eat",
        "<div>to eat<i>(v1)</i></div>",
        "<ol><li>to eat<i>(v1)</i></li><li>to consume<i>(v1)</i></li><li><div>to dine<i>(formal)</i></div></li></ol>",
        "<ul><li>short</li><li>a definition well over twenty characters long</li></ul>",
        "<ol><li>profit<i>(n)</i></li><li>profit<i>(n, vt)</i></li></ol>",
        "<i>(uk)</i>",
    ];
    for input in inputs {
        let once = canonicalize(input);
        let twice = canonicalize(&once);
        assert_eq!(once, twice, "not a fixed point for {:?}", input);
    }
}

#[test]
fn tag_annotations_order_by_registry_then_name() {
    // P sorts before part-of-speech tags, which sort before usage tags
    let markup = "word<i>(uk, v1, P)</i>";
    let rendered = canonicalize(markup);
    let p = rendered.find("\">P<").expect("P rendered");
    let v1 = rendered.find("\">v1<").expect("v1 rendered");
    let uk = rendered.find("\">uk<").expect("uk rendered");
    assert!(p < v1 && v1 < uk);
}

#[test]
fn deeply_redundant_nesting_collapses() {
    // the same sense repeated across nesting levels collapses to one
    let markup = concat!(
        "<div>",
        "<ul><li>to eat<i>(v1)</i></li></ul>",
        "<ul><li><ul><li>to eat<i>(v1)</i></li></ul></li></ul>",
        "</div>",
    );
    let rendered = canonicalize(markup);
    assert_eq!(
        rendered,
        "to eat<em><span title=\"Ichidan verb\">v1</span></em>"
    );
}
