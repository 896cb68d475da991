use std::fmt;
use std::ops::Range;

/// Which extraction rule produced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionRule {
    /// `\includegraphics{path}`
    IncludeGraphics,
    /// `![alt](path)`
    MarkdownImage,
    /// `key: value`
    YamlValue,
    /// `key=value`
    InlineAttribute,
}

impl fmt::Display for ExtractionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IncludeGraphics => "includegraphics",
            Self::MarkdownImage => "markdown-image",
            Self::YamlValue => "yaml-value",
            Self::InlineAttribute => "inline-attribute",
        };
        f.write_str(name)
    }
}

/// A candidate media path exactly as written in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// The path string as it appears in the text
    pub raw: String,
    /// Byte range of `raw` within the document content
    pub span: Range<usize>,
    /// Rule that matched it
    pub rule: ExtractionRule,
}

impl MediaReference {
    pub fn new(raw: impl Into<String>, span: Range<usize>, rule: ExtractionRule) -> Self {
        Self {
            raw: raw.into(),
            span,
            rule,
        }
    }
}
