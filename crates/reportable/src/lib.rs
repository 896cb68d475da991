//! Reportable media collector
//!
//! Scans a single LaTeX, Markdown or Quarto report for the local media it links to,
//! copies the valid files into an output tree and, for Quarto, rewrites the report
//! against the copies and hands it to an external renderer.

pub mod cli;
pub mod config;
pub mod document;
pub mod errors;
pub mod output;
pub mod pipeline;
pub mod render;

// Re-export commonly used types
pub use config::ReportableConfig;
pub use document::{DocumentFormat, MediaExtensions, SourceDocument};
pub use errors::{ActionableError, ExtractError};
pub use output::OutputContext;
pub use pipeline::{extract, ExtractOptions, ExtractReport};
pub use render::{CommandRenderer, RenderOutcome, Renderer};
