//! Configuration file loading and parsing.
//!
//! An optional `reportable.toml` next to the report (or the file passed with
//! `--config`) tunes the pipeline. Every field is optional; missing ones fall
//! back to the defaults below.

use crate::document::{CollisionPolicy, MediaExtensions};
use crate::render::{CommandRenderer, OutputMode};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up beside the report.
pub const CONFIG_FILE_NAME: &str = "reportable.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportableConfig {
    /// Asset subdirectory name inside the output directory (default: "assets").
    pub assets_dir: Option<String>,
    /// Media detection settings (optional).
    pub media: Option<MediaConfig>,
    /// Copy-stage settings (optional).
    pub copy: Option<CopyConfig>,
    /// Renderer settings (optional).
    pub render: Option<RenderConfig>,
}

/// Media detection configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Supported extensions, with or without the leading dot.
    pub extensions: Option<Vec<String>>,
}

/// Copy-stage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyConfig {
    /// Policy when two sources share a filename (default: overwrite).
    pub on_collision: Option<CollisionPolicy>,
}

/// External renderer configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Whether to run the renderer after emitting (default: true).
    pub enabled: Option<bool>,
    /// Program to run (default: "quarto").
    pub program: Option<String>,
    /// Arguments placed before the document path (default: ["render"]).
    pub args: Option<Vec<String>>,
    /// Inherit or capture the child's output (default: inherit).
    pub output: Option<OutputMode>,
    /// Treat a non-zero exit as a fatal error (default: false).
    pub fail_on_error: Option<bool>,
}

impl ReportableConfig {
    /// Load configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `reportable.toml` beside the report
    /// is used when present, and defaults when not.
    pub fn load(explicit: Option<&Path>, report_file: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let candidate = Self::default_path(report_file);
                if candidate.is_file() {
                    Self::from_file(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// `reportable.toml` in the report's directory.
    pub fn default_path(report_file: &Path) -> PathBuf {
        report_file
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(CONFIG_FILE_NAME)
    }

    /// Parse a configuration file. A missing or malformed file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn assets_dir(&self) -> String {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| "assets".to_string())
    }

    pub fn extensions(&self) -> MediaExtensions {
        self.media
            .as_ref()
            .and_then(|m| m.extensions.as_ref())
            .map(MediaExtensions::new)
            .unwrap_or_default()
    }

    pub fn on_collision(&self) -> CollisionPolicy {
        self.copy
            .as_ref()
            .and_then(|c| c.on_collision)
            .unwrap_or_default()
    }

    pub fn render(&self) -> RenderConfig {
        self.render.clone().unwrap_or_default()
    }
}

impl RenderConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn program(&self) -> String {
        self.program
            .clone()
            .unwrap_or_else(|| CommandRenderer::DEFAULT_PROGRAM.to_string())
    }

    pub fn args(&self) -> Vec<String> {
        self.args
            .clone()
            .unwrap_or_else(|| vec!["render".to_string()])
    }

    pub fn output(&self) -> OutputMode {
        self.output.unwrap_or_default()
    }

    pub fn fail_on_error(&self) -> bool {
        self.fail_on_error.unwrap_or(false)
    }

    /// The renderer this configuration describes.
    pub fn renderer(&self) -> CommandRenderer {
        CommandRenderer::new(self.program(), self.args()).with_output(self.output())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ReportableConfig::default();
        assert_eq!(config.assets_dir(), "assets");
        assert_eq!(config.extensions(), MediaExtensions::default());
        assert_eq!(config.on_collision(), CollisionPolicy::Overwrite);

        let render = config.render();
        assert!(render.enabled());
        assert_eq!(render.program(), "quarto");
        assert_eq!(render.args(), vec!["render"]);
        assert_eq!(render.output(), OutputMode::Inherit);
        assert!(!render.fail_on_error());
    }

    #[test]
    fn test_full_config() {
        let config = ReportableConfig::from_toml(
            r#"
assets_dir = "media"

[media]
extensions = [".png", "WEBP"]

[copy]
on_collision = "rename"

[render]
enabled = false
program = "pandoc"
args = ["--standalone", "-o", "out.html"]
output = "capture"
fail_on_error = true
"#,
        )
        .unwrap();

        assert_eq!(config.assets_dir(), "media");
        assert_eq!(config.extensions(), MediaExtensions::new(["png", "webp"]));
        assert_eq!(config.on_collision(), CollisionPolicy::Rename);

        let render = config.render();
        assert!(!render.enabled());
        assert_eq!(render.program(), "pandoc");
        assert_eq!(render.args(), vec!["--standalone", "-o", "out.html"]);
        assert_eq!(render.output(), OutputMode::Capture);
        assert!(render.fail_on_error());
        assert_eq!(render.renderer().program(), "pandoc");
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = ReportableConfig::from_toml("[copy]\non_collision = \"error\"\n").unwrap();
        assert_eq!(config.on_collision(), CollisionPolicy::Error);
        assert_eq!(config.assets_dir(), "assets");
        assert!(config.render().enabled());
    }

    #[test]
    fn test_rejects_unknown_keys_and_values() {
        assert!(ReportableConfig::from_toml("asset_dir = \"x\"").is_err());
        assert!(ReportableConfig::from_toml("[copy]\non_collision = \"merge\"").is_err());
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("report.qmd");

        let config = ReportableConfig::load(None, &report).unwrap();
        assert!(config.assets_dir.is_none());
    }

    #[test]
    fn test_load_finds_file_beside_report() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "assets_dir = \"figs\"").unwrap();
        let report = temp.path().join("report.qmd");

        let config = ReportableConfig::load(None, &report).unwrap();
        assert_eq!(config.assets_dir(), "figs");
    }

    #[test]
    fn test_load_explicit_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        let err = ReportableConfig::load(Some(&missing), &temp.path().join("r.qmd")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_malformed_is_error_with_context() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "assets_dir = [").unwrap();

        let err = ReportableConfig::load(None, &temp.path().join("r.qmd")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
