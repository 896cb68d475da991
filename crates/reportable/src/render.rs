//! External renderer invocation
//!
//! The renderer is invoked directly with an argument vector, never through a
//! shell, so the document path is passed through untouched.

use crate::errors::{self, ExtractError};
use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::info;

/// What the renderer reported back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOutcome {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured stdout (empty when output is inherited)
    pub stdout: String,
    /// Captured stderr (empty when output is inherited)
    pub stderr: String,
}

impl RenderOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Builds a document from the emitted file.
pub trait Renderer {
    /// Human-readable program name for messages
    fn name(&self) -> &str;

    fn render(&self, path: &Path) -> Result<RenderOutcome, ExtractError>;
}

/// Where the child's stdout and stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Stream to this process's terminal
    #[default]
    Inherit,
    /// Collect into the [`RenderOutcome`]
    Capture,
}

/// Runs `<program> <args...> <path>` in the document's directory.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    output: OutputMode,
}

impl CommandRenderer {
    pub const DEFAULT_PROGRAM: &'static str = "quarto";

    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            output: OutputMode::Inherit,
        }
    }

    /// `quarto render <path>`
    pub fn quarto() -> Self {
        Self::new(Self::DEFAULT_PROGRAM, vec!["render".to_string()])
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self::quarto()
    }
}

impl Renderer for CommandRenderer {
    fn name(&self) -> &str {
        &self.program
    }

    fn render(&self, path: &Path) -> Result<RenderOutcome, ExtractError> {
        let program = which::which(&self.program)
            .map_err(|_| errors::renderer_not_found(&self.program))?;
        // Absolute, so it still resolves once the child runs in the document's directory
        let path = path
            .canonicalize()
            .map_err(ExtractError::io("Failed to resolve document", path))?;

        let mut cmd = Command::new(&program);
        cmd.args(&self.args).arg(&path);
        if let Some(dir) = path.parent() {
            cmd.current_dir(dir);
        }

        info!(program = %program.display(), path = %path.display(), "running renderer");

        match self.output {
            OutputMode::Inherit => {
                let status = cmd
                    .stdin(Stdio::null())
                    .status()
                    .map_err(ExtractError::io("Failed to run renderer", &program))?;
                Ok(RenderOutcome {
                    exit_code: status.code(),
                    ..RenderOutcome::default()
                })
            }
            OutputMode::Capture => {
                let output = cmd
                    .stdin(Stdio::null())
                    .output()
                    .map_err(ExtractError::io("Failed to run renderer", &program))?;
                Ok(RenderOutcome {
                    exit_code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                })
            }
        }
    }
}
