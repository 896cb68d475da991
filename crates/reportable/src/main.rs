//! Reportable media collector
//!
//! Command-line entry point: parses arguments, sets up logging, loads the
//! configuration and runs the extract pipeline.

use anyhow::Result;
use clap::Parser;
use reportable::cli::{Cli, Commands};
use reportable::document::AdapterRegistry;
use reportable::output::{ExitCode, OutputContext};
use reportable::pipeline::{self, ExtractOptions};
use reportable::{DocumentFormat, ExtractError, ReportableConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive (e.g. `reportable=debug`).
const LOG_ENV: &str = "REPORTABLE_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let out = OutputContext::new(cli.quiet);
    let exit_code = match run(cli, &out) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let _ = out.print_error(format!("{:#}", e));
            ExitCode::Failure
        }
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run(cli: Cli, out: &OutputContext) -> Result<()> {
    match cli.command {
        Commands::Extract {
            report_file,
            output_dir,
            config,
            assets_dir,
            on_collision,
            no_render,
        } => {
            // An unsupported input is reported before any configuration is read
            if DocumentFormat::from_path(&report_file).is_none() {
                return Err(ExtractError::UnsupportedFormat { path: report_file }.into());
            }
            let config = ReportableConfig::load(config.as_deref(), &report_file)?;
            debug!(?config, "loaded configuration");

            let mut options = ExtractOptions::from_config(&report_file, &output_dir, &config);
            if let Some(assets_dir) = assets_dir {
                options.assets_dir = assets_dir;
            }
            if let Some(policy) = on_collision {
                options.on_collision = policy;
            }
            if no_render {
                options.render = false;
            }

            let renderer = config.render().renderer();
            let registry = AdapterRegistry::with_builtins();
            let report = pipeline::extract(&options, &registry, &renderer, out)?;

            let _ = out.print_info(format!(
                "Copied {} of {} media reference(s) into {}",
                report.copied_references,
                report.candidates,
                report.asset_dir.display()
            ));
            if let Some(document) = &report.document {
                debug!(path = %document.display(), "emitted document");
            }
            Ok(())
        }
    }
}
