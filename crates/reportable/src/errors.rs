//! Error types for the extraction pipeline.
//!
//! [`ExtractError`] is the library's error enum. [`ActionableError`] wraps a message
//! with possible causes and remediation steps for failures the user can fix on
//! their own (a missing renderer, a stale `_extensions` copy).

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(
        "Unsupported file type. Please provide a LaTeX (.tex), Markdown (.md), or Quarto (.qmd) file."
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("{action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "Destination collision: {} and {} both map to {}",
        .first.display(),
        .second.display(),
        .destination.display()
    )]
    Collision {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid assets directory '{0}': expected a single directory name")]
    InvalidAssetsDir(String),

    #[error("Refusing to overwrite the source document at {}", .0.display())]
    WouldOverwriteSource(PathBuf),

    #[error("Renderer '{program}' failed with {}", exit_description(.exit_code))]
    RenderFailed {
        program: String,
        exit_code: Option<i32>,
    },

    #[error(transparent)]
    Actionable(#[from] ActionableError),
}

impl ExtractError {
    /// Build a `map_err` closure that tags an I/O error with its path.
    pub(crate) fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use reportable::errors::ActionableError;
///
/// let error = ActionableError::new("Renderer 'quarto' was not found on PATH")
///     .with_cause("Quarto is not installed")
///     .with_remedy("Install Quarto from https://quarto.org")
///     .with_remedy("Skip the build step with --no-render");
///
/// assert!(error.to_string().contains("To fix:"));
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    error: String,
    causes: Vec<String>,
    remediation: Vec<String>,
}

impl ActionableError {
    /// Create a new actionable error with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    /// The headline message without causes or remedies.
    pub fn message(&self) -> &str {
        &self.error
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if !self.causes.is_empty() {
            writeln!(f, "\nPossible causes:")?;
            for cause in &self.causes {
                writeln!(f, "  • {}", cause)?;
            }
        }

        if !self.remediation.is_empty() {
            writeln!(f, "\nTo fix:")?;
            for remedy in &self.remediation {
                writeln!(f, "  • {}", remedy)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ActionableError {}

/// The configured renderer could not be located on the search path.
pub fn renderer_not_found(program: &str) -> ActionableError {
    ActionableError::new(format!("Renderer '{}' was not found on PATH", program))
        .with_cause(format!("'{}' is not installed", program))
        .with_cause("The program is installed outside the directories listed in PATH")
        .with_remedy(format!("Install '{}' or add it to PATH", program))
        .with_remedy("Point [render].program in reportable.toml at another renderer")
        .with_remedy("Skip the build step with --no-render")
}

/// A previous run already copied `_extensions` to the destination.
pub fn extensions_exist(destination: &Path) -> ActionableError {
    ActionableError::new(format!(
        "Extensions directory already exists: {}",
        destination.display()
    ))
    .with_cause("The report was already extracted into this output directory")
    .with_remedy(format!("Remove {} and run again", destination.display()))
    .with_remedy("Extract into an empty output directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable_error_lists_causes_and_remedies() {
        let error = ActionableError::new("Something broke")
            .with_cause("Cause one")
            .with_remedy("Fix one")
            .with_remedy("Fix two");

        let text = error.to_string();
        assert!(text.starts_with("Something broke\n"));
        assert!(text.contains("Possible causes:\n  • Cause one"));
        assert!(text.contains("To fix:\n  • Fix one\n  • Fix two"));
    }

    #[test]
    fn test_actionable_error_without_details_is_single_line() {
        let error = ActionableError::new("Plain");
        assert_eq!(error.to_string(), "Plain\n");
        assert_eq!(error.message(), "Plain");
    }

    #[test]
    fn test_renderer_not_found_names_program() {
        let error = renderer_not_found("quarto");
        assert!(error.message().contains("'quarto'"));
        assert!(error.to_string().contains("--no-render"));
    }

    #[test]
    fn test_unsupported_format_message() {
        let error = ExtractError::UnsupportedFormat {
            path: PathBuf::from("report.docx"),
        };
        assert_eq!(
            error.to_string(),
            "Unsupported file type. Please provide a LaTeX (.tex), Markdown (.md), or Quarto (.qmd) file."
        );
    }

    #[test]
    fn test_render_failed_describes_signal() {
        let error = ExtractError::RenderFailed {
            program: "quarto".to_string(),
            exit_code: None,
        };
        assert!(error.to_string().contains("terminated by signal"));

        let error = ExtractError::RenderFailed {
            program: "quarto".to_string(),
            exit_code: Some(2),
        };
        assert!(error.to_string().contains("exit code 2"));
    }
}
