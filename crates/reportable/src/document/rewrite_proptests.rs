//! Property-based tests for span rewriting
//!
//! Documents are generated from path fragments that are frequently substrings of
//! one another, the case sequential `replace` gets wrong.

use super::*;
use proptest::prelude::*;

// Short paths over a tiny alphabet so prefixes and suffixes collide often
fn path_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ab]{1,2}\\.png",
        "[ab]{1,2}/[ab]{1,2}\\.png",
        "\\./[ab]{1,2}\\.png",
    ]
}

fn filler_strategy() -> impl Strategy<Value = String> {
    "[a-z ]{0,8}"
}

fn document_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
    prop::collection::vec((filler_strategy(), path_strategy()), 1..8).prop_map(|parts| {
        let mut text = String::new();
        let mut paths = Vec::new();
        for (filler, path) in parts {
            text.push_str(&filler);
            text.push_str(&format!("![]({})\n", path));
            paths.push(path);
        }
        (text, paths)
    })
}

fn numbered_mapping(text: &str) -> (RewriteMapping, Vec<String>) {
    let mut mapping = RewriteMapping::new();
    let mut expected = Vec::new();
    for (index, reference) in MarkdownAdapter.extract(text).into_iter().enumerate() {
        let new = format!("assets/{}.png", index);
        expected.push(new.clone());
        mapping.push(reference.raw, new, reference.span);
    }
    (mapping, expected)
}

proptest! {
    // Property 1: each extracted reference is rewritten exactly once, to its own target
    #[test]
    fn prop_each_span_rewritten_once((text, paths) in document_strategy()) {
        let (mapping, expected) = numbered_mapping(&text);
        prop_assert_eq!(mapping.len(), paths.len());

        let rewritten = rewrite(&text, &mapping);
        let found: Vec<String> = MarkdownAdapter
            .extract(&rewritten)
            .into_iter()
            .map(|r| r.raw)
            .collect();
        prop_assert_eq!(found, expected);
    }

    // Property 2: text outside the spans is preserved byte for byte
    #[test]
    fn prop_surrounding_text_preserved((text, _paths) in document_strategy()) {
        let (mapping, _) = numbered_mapping(&text);
        let rewritten = rewrite(&text, &mapping);

        let strip = |s: &str| {
            MarkdownAdapter
                .extract(s)
                .iter()
                .rev()
                .fold(s.to_string(), |mut acc, r| {
                    acc.replace_range(r.span.clone(), "");
                    acc
                })
        };
        prop_assert_eq!(strip(&text), strip(&rewritten));
    }

    // Property 3: rewriting with an empty mapping is the identity
    #[test]
    fn prop_empty_mapping_identity((text, _paths) in document_strategy()) {
        prop_assert_eq!(rewrite(&text, &RewriteMapping::new()), text);
    }
}
