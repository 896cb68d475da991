//! Input formats and the in-memory source document.

use crate::errors::ExtractError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Formats the extractor understands, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// `.tex`
    Latex,
    /// `.md`
    Markdown,
    /// `.qmd`
    Quarto,
}

impl DocumentFormat {
    /// Detect the format from a path's extension.
    ///
    /// Matching is exact and case-sensitive: `report.TEX` is not recognized.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "tex" => Some(Self::Latex),
            "md" => Some(Self::Markdown),
            "qmd" => Some(Self::Quarto),
            _ => None,
        }
    }

    /// Human-readable label used in progress messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Latex => "LaTeX",
            Self::Markdown | Self::Quarto => "Markdown/Quarto",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Latex => "latex",
            Self::Markdown => "markdown",
            Self::Quarto => "quarto",
        };
        f.write_str(name)
    }
}

/// A report read into memory.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    path: PathBuf,
    content: String,
    format: DocumentFormat,
    base_dir: PathBuf,
}

impl SourceDocument {
    /// Read the document at `path`, detecting its format from the extension.
    ///
    /// The format is checked before the file is touched, so an unsupported
    /// extension fails without I/O.
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let format = DocumentFormat::from_path(path).ok_or_else(|| {
            ExtractError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
        })?;

        let content =
            fs::read_to_string(path).map_err(ExtractError::io("Failed to read document", path))?;

        Self::from_parts(path, content, format)
    }

    /// Build a document from content already in memory.
    pub fn from_parts(
        path: &Path,
        content: String,
        format: DocumentFormat,
    ) -> Result<Self, ExtractError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base_dir = parent
            .canonicalize()
            .map_err(ExtractError::io("Failed to resolve document directory", &parent))?;

        Ok(Self {
            path: path.to_path_buf(),
            content,
            format,
            base_dir,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Absolute directory relative references are resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The document's own filename, e.g. `report.qmd`.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }
}
