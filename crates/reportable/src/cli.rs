//! Command-line interface definitions using clap.

use crate::document::CollisionPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reportable media collector
///
/// Copies the local images, video and audio a LaTeX, Markdown or Quarto report
/// links to into one output directory. Quarto reports are also rewritten to point
/// at the copies and rendered.
///
/// Exit Codes:
///   0  - Extraction finished (skipped media is only a warning)
///   1  - Unsupported input, I/O failure or fatal renderer error
#[derive(Parser)]
#[command(name = "reportable")]
#[command(about = "Collect the media a report links to", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy a report's media into OUTPUT_DIR
    ///
    /// Media lands in OUTPUT_DIR/assets. For Quarto reports the rewritten
    /// document and any _extensions directory are written to OUTPUT_DIR and
    /// the renderer is run on the result.
    ///
    /// Examples:
    ///   reportable extract paper.tex dist
    ///   reportable extract report.qmd dist --on-collision rename --no-render
    Extract {
        /// The .tex, .md or .qmd report
        report_file: PathBuf,

        /// Destination directory (created if missing)
        output_dir: PathBuf,

        /// Configuration file (default: reportable.toml beside the report)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Asset subdirectory name inside OUTPUT_DIR
        #[arg(long)]
        assets_dir: Option<String>,

        /// What to do when two media files share a name
        #[arg(long, value_enum)]
        on_collision: Option<CollisionPolicy>,

        /// Skip running the renderer after emitting
        #[arg(long)]
        no_render: bool,
    },
}
