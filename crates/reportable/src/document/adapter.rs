//! Format adapter trait and registry
//!
//! Each input format implements [`FormatAdapter`] to turn raw document text into
//! candidate media references. Adapters are deliberately permissive: they never
//! look at the filesystem, and the validation stage in `resolve` is what throws
//! away false positives.

use super::format::DocumentFormat;
use super::reference::{ExtractionRule, MediaReference};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A pipeline stage a format adapter may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    Validate,
    Copy,
    Rewrite,
    Emit,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Extract,
        Stage::Validate,
        Stage::Copy,
        Stage::Rewrite,
        Stage::Emit,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Validate => "validate",
            Stage::Copy => "copy",
            Stage::Rewrite => "rewrite",
            Stage::Emit => "emit",
        };
        f.write_str(name)
    }
}

/// The set of stages an adapter takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    stages: &'static [Stage],
}

impl Capabilities {
    /// Extract, validate and copy; the document itself is left alone.
    pub const COLLECT: Self = Self {
        stages: &[Stage::Extract, Stage::Validate, Stage::Copy],
    };

    /// Every stage, including rewriting and emitting the document.
    pub const FULL: Self = Self { stages: &Stage::ALL };

    pub fn supports(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Stages this adapter does not implement, in pipeline order.
    pub fn missing(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| !self.supports(*stage))
            .collect()
    }
}

/// Trait for document format adapters
///
/// # Example
///
/// ```
/// use reportable::document::{FormatAdapter, MarkdownAdapter};
///
/// let refs = MarkdownAdapter.extract("Intro\n\n![Logo](./logo.png)\n");
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].raw, "./logo.png");
/// ```
pub trait FormatAdapter {
    /// Returns the adapter identifier (e.g., "latex", "quarto")
    fn id(&self) -> &str;

    /// The format this adapter handles
    fn format(&self) -> DocumentFormat;

    /// Extract candidate media references in document order.
    ///
    /// Duplicates are preserved. Empty captures are dropped.
    fn extract(&self, content: &str) -> Vec<MediaReference>;

    /// Stages this format supports.
    fn capabilities(&self) -> Capabilities {
        Capabilities::COLLECT
    }
}

/// Registry mapping each format to its adapter
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn FormatAdapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Create a registry with the LaTeX, Markdown and Quarto adapters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LatexAdapter));
        registry.register(Box::new(MarkdownAdapter));
        registry.register(Box::new(QuartoAdapter));
        registry
    }

    /// Register a format adapter. Later registrations win for the same format.
    pub fn register(&mut self, adapter: Box<dyn FormatAdapter>) {
        self.adapters.retain(|a| a.format() != adapter.format());
        self.adapters.push(adapter);
    }

    pub fn resolve(&self, format: DocumentFormat) -> Option<&dyn FormatAdapter> {
        self.adapters
            .iter()
            .find(|a| a.format() == format)
            .map(|a| a.as_ref())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn latex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\\includegraphics(?:\[[^\]]*\])?\{([^}]+)\}").expect("valid LaTeX pattern")
    })
}

fn markdown_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(MARKDOWN_IMAGE).expect("valid Markdown pattern"))
}

fn quarto_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let pattern = format!(
            r#"(?m):[ \t]*["']?({value})["']?|=[ \t]*["']?({value})["']?|{image}"#,
            value = QUARTO_VALUE,
            image = MARKDOWN_IMAGE,
        );
        Regex::new(&pattern).expect("valid Quarto pattern")
    })
}

/// `![alt](path)` or `![alt](path "title")`; group 1 is the path, which may
/// contain spaces. Padding inside the parentheses is not part of it.
const MARKDOWN_IMAGE: &str = r#"!\[.*?\]\([ \t]*([^)\n]*?)(?:[ \t]+"[^"\n]*")?[ \t]*\)"#;

/// A bare or quoted scalar. It never starts with `!`, so `Caption: ![](a.png)`
/// leaves the image to the Markdown alternative, and it stops at braces so the
/// closing `}` of an attribute block is not part of the path.
const QUARTO_VALUE: &str = r#"[^"'\s,!{}][^"'\s,{}]*"#;

/// Collect every non-empty capture group, tagging group `i` with `rules[i - 1]`.
fn collect_captures(
    pattern: &Regex,
    content: &str,
    rules: &[ExtractionRule],
) -> Vec<MediaReference> {
    let mut references = Vec::new();
    for caps in pattern.captures_iter(content) {
        for (index, rule) in rules.iter().enumerate() {
            if let Some(m) = caps.get(index + 1) {
                if !m.as_str().is_empty() {
                    references.push(MediaReference::new(m.as_str(), m.range(), *rule));
                }
            }
        }
    }
    references
}

/// LaTeX adapter
///
/// Matches `\includegraphics{path}` and `\includegraphics[options]{path}`,
/// capturing the brace argument verbatim.
pub struct LatexAdapter;

impl FormatAdapter for LatexAdapter {
    fn id(&self) -> &str {
        "latex"
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Latex
    }

    fn extract(&self, content: &str) -> Vec<MediaReference> {
        collect_captures(latex_pattern(), content, &[ExtractionRule::IncludeGraphics])
    }
}

/// Markdown adapter
///
/// Matches image syntax only: `![alt](path)`. Plain links are not media.
pub struct MarkdownAdapter;

impl FormatAdapter for MarkdownAdapter {
    fn id(&self) -> &str {
        "markdown"
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Markdown
    }

    fn extract(&self, content: &str) -> Vec<MediaReference> {
        collect_captures(markdown_pattern(), content, &[ExtractionRule::MarkdownImage])
    }
}

/// Quarto adapter
///
/// Recovers paths from three surface syntaxes anywhere in the text:
///
/// - `key: value` pairs, as in YAML front matter (`image: "cover.png"`)
/// - `key=value` inline attributes (`{background-image=bg.jpg}`)
/// - Markdown images (`![Figure](plots/a.svg)`)
///
/// This over-captures on purpose (every scalar after a colon is a candidate)
/// because media can sit under arbitrary keys.
pub struct QuartoAdapter;

impl FormatAdapter for QuartoAdapter {
    fn id(&self) -> &str {
        "quarto"
    }

    fn format(&self) -> DocumentFormat {
        DocumentFormat::Quarto
    }

    fn extract(&self, content: &str) -> Vec<MediaReference> {
        collect_captures(
            quarto_pattern(),
            content,
            &[
                ExtractionRule::YamlValue,
                ExtractionRule::InlineAttribute,
                ExtractionRule::MarkdownImage,
            ],
        )
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }
}
