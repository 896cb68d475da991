//! Reference rewriting
//!
//! [`rewrite`] splices new paths in at the byte spans recorded during extraction,
//! working from the end of the text backwards. Each span is replaced exactly once
//! and replacement text is never scanned again, so an old path that happens to be
//! a substring of another cannot cause a partial rewrite.

use super::copy::CopyOutcome;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// One substitution: the text at `span` (which reads `old`) becomes `new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEntry {
    pub old: String,
    pub new: String,
    pub span: Range<usize>,
}

/// Ordered substitutions for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteMapping {
    entries: Vec<RewriteEntry>,
}

impl RewriteMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the mapping from copy outcomes.
    ///
    /// Every reference that ended up in the destination maps to
    /// `<dest_dir_name>/<final filename>`; skipped ones are left out.
    pub fn from_outcomes(outcomes: &[CopyOutcome], dest_dir: &Path) -> Self {
        let dir_name = dest_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut mapping = Self::new();
        for copied in outcomes.iter().filter_map(CopyOutcome::copied) {
            let file_name = copied.file_name().to_string_lossy();
            let new = if dir_name.is_empty() {
                file_name.into_owned()
            } else {
                format!("{}/{}", dir_name, file_name)
            };
            let reference = &copied.asset.reference;
            mapping.push(reference.raw.clone(), new, reference.span.clone());
        }
        mapping
    }

    pub fn push(&mut self, old: impl Into<String>, new: impl Into<String>, span: Range<usize>) {
        self.entries.push(RewriteEntry {
            old: old.into(),
            new: new.into(),
            span,
        });
    }

    pub fn entries(&self) -> &[RewriteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(old, new)` pairs in document order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.old.as_str(), entry.new.as_str()))
    }
}

/// Apply `mapping` to `text` in a single pass.
///
/// An entry whose span is out of bounds, does not read `old` or overlaps an
/// entry already applied is ignored.
pub fn rewrite(text: &str, mapping: &RewriteMapping) -> String {
    let mut entries: Vec<&RewriteEntry> = mapping.entries.iter().collect();
    entries.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut output = text.to_string();
    let mut floor = text.len();
    for entry in entries {
        let span = entry.span.clone();
        if span.end > floor || text.get(span.clone()) != Some(entry.old.as_str()) {
            debug!(old = %entry.old, start = span.start, "skipping stale rewrite span");
            continue;
        }
        output.replace_range(span.clone(), &entry.new);
        floor = span.start;
    }
    output
}

/// Sequential literal substitution of `old[i]` by `new[i]` over the whole text.
///
/// Each pass runs on the output of the previous one, so an earlier replacement
/// can be altered by a later pair. Prefer [`rewrite`] for document output.
pub fn replace_literal<O, N>(text: &str, old: &[O], new: &[N]) -> String
where
    O: AsRef<str>,
    N: AsRef<str>,
{
    old.iter()
        .zip(new)
        .fold(text.to_string(), |acc, (old, new)| {
            acc.replace(old.as_ref(), new.as_ref())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FormatAdapter, QuartoAdapter};

    fn mapping_for(text: &str, pairs: &[(&str, &str)]) -> RewriteMapping {
        let mut mapping = RewriteMapping::new();
        for (old, new) in pairs {
            for (start, _) in text.match_indices(old) {
                mapping.push(*old, *new, start..start + old.len());
            }
        }
        mapping
    }

    #[test]
    fn test_rewrite_single_reference() {
        let text = "Intro\n\n![Plot](./img/a.png)\n";
        let mapping = mapping_for(text, &[("./img/a.png", "assets/a.png")]);
        assert_eq!(rewrite(text, &mapping), "Intro\n\n![Plot](assets/a.png)\n");
    }

    #[test]
    fn test_rewrite_substring_paths_are_independent() {
        let text = "![](a.png) ![](data/a.png)";
        let mut mapping = RewriteMapping::new();
        mapping.push("a.png", "assets/a.png", 4..9);
        mapping.push("data/a.png", "assets/a-1.png", 15..25);

        assert_eq!(
            rewrite(text, &mapping),
            "![](assets/a.png) ![](assets/a-1.png)"
        );
    }

    #[test]
    fn test_replace_literal_has_ordering_hazard() {
        let text = "![](a.png) ![](data/a.png)";
        let rewritten = replace_literal(text, &["a.png", "data/a.png"], &["assets/a.png", "assets/b.png"]);
        // `data/a.png` was already partially rewritten to `data/assets/a.png`
        assert_eq!(rewritten, "![](assets/a.png) ![](data/assets/a.png)");
    }

    #[test]
    fn test_rewrite_ignores_stale_and_overlapping_spans() {
        let text = "![](a.png)";
        let mut mapping = RewriteMapping::new();
        mapping.push("a.png", "assets/a.png", 4..9);
        mapping.push("a.png", "elsewhere", 3..8);
        mapping.push("b.png", "assets/b.png", 4..9);
        mapping.push("a.png", "assets/a.png", 40..45);

        assert_eq!(rewrite(text, &mapping), "![](assets/a.png)");
    }

    #[test]
    fn test_rewrite_only_touches_extracted_spans() {
        let text = "image: cover.png\n\nThe file `cover.png` is the cover.\n";
        let mut mapping = RewriteMapping::new();
        mapping.push("cover.png", "assets/cover.png", 7..16);

        assert_eq!(
            rewrite(text, &mapping),
            "image: assets/cover.png\n\nThe file `cover.png` is the cover.\n"
        );
    }

    #[test]
    fn test_rewrite_with_extracted_spans() {
        let text = "---\nimage: \"img/cover.png\"\n---\n![](img/cover.png){width=50%}\n";
        let mut mapping = RewriteMapping::new();
        for reference in QuartoAdapter.extract(text) {
            if reference.raw.ends_with(".png") {
                mapping.push(reference.raw.clone(), "assets/cover.png", reference.span);
            }
        }
        assert_eq!(mapping.len(), 2);
        assert_eq!(
            rewrite(text, &mapping),
            "---\nimage: \"assets/cover.png\"\n---\n![](assets/cover.png){width=50%}\n"
        );
    }

    #[test]
    fn test_empty_mapping_is_identity() {
        let mapping = RewriteMapping::new();
        assert!(mapping.is_empty());
        assert_eq!(rewrite("unchanged", &mapping), "unchanged");
    }

    #[test]
    fn test_pairs_in_document_order() {
        let mut mapping = RewriteMapping::new();
        mapping.push("x.png", "assets/x.png", 0..5);
        mapping.push("y.png", "assets/y.png", 10..15);
        let pairs: Vec<_> = mapping.pairs().collect();
        assert_eq!(
            pairs,
            vec![("x.png", "assets/x.png"), ("y.png", "assets/y.png")]
        );
    }
}
