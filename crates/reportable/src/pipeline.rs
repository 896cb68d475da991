//! The extract pipeline
//!
//! Dispatches on the report's extension and drives the stages its adapter
//! supports: extract, validate and copy for every format, then rewrite, emit and
//! render for formats that support them (Quarto). Stages run one after another
//! and the first fatal error stops the run; nothing already written is rolled back.

use crate::config::ReportableConfig;
use crate::document::{
    rewrite, validate, AdapterRegistry, AssetCopier, CollisionPolicy, CopiedAsset, CopyOutcome,
    DocumentEmitter, DocumentFormat, MediaExtensions, RewriteMapping, SourceDocument, Stage,
};
use crate::errors::ExtractError;
use crate::output::OutputContext;
use crate::render::{RenderOutcome, Renderer};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, info_span};

/// Inputs for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// The `.tex`, `.md` or `.qmd` report
    pub report_file: PathBuf,
    /// Destination root; assets go to `<output_dir>/<assets_dir>`
    pub output_dir: PathBuf,
    /// Asset subdirectory name (a single path component)
    pub assets_dir: String,
    pub extensions: MediaExtensions,
    pub on_collision: CollisionPolicy,
    /// Run the renderer after emitting
    pub render: bool,
    /// Treat a non-zero renderer exit as fatal
    pub fail_on_render_error: bool,
}

impl ExtractOptions {
    pub fn new(report_file: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(report_file, output_dir, &ReportableConfig::default())
    }

    pub fn from_config(
        report_file: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        config: &ReportableConfig,
    ) -> Self {
        let render = config.render();
        Self {
            report_file: report_file.into(),
            output_dir: output_dir.into(),
            assets_dir: config.assets_dir(),
            extensions: config.extensions(),
            on_collision: config.on_collision(),
            render: render.enabled(),
            fail_on_render_error: render.fail_on_error(),
        }
    }

    /// `<output_dir>/<assets_dir>`
    pub fn asset_dir(&self) -> PathBuf {
        self.output_dir.join(&self.assets_dir)
    }
}

/// What a run did.
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub format: DocumentFormat,
    /// Candidate references found by the extractor
    pub candidates: usize,
    /// References that passed validation
    pub valid: usize,
    /// Resolved paths of references that were not copied
    pub skipped: Vec<PathBuf>,
    /// Files copied into the asset directory (one per distinct source)
    pub copied: Vec<CopiedAsset>,
    /// References that point at a file in the asset directory
    pub copied_references: usize,
    /// References rewritten in the emitted document
    pub mapping: RewriteMapping,
    /// Stages the format does not support
    pub unsupported_stages: Vec<Stage>,
    pub asset_dir: PathBuf,
    pub document: Option<PathBuf>,
    pub extensions: Option<PathBuf>,
    pub render: Option<RenderOutcome>,
}

impl ExtractReport {
    fn new(format: DocumentFormat, asset_dir: PathBuf) -> Self {
        Self {
            format,
            candidates: 0,
            valid: 0,
            skipped: Vec::new(),
            copied: Vec::new(),
            copied_references: 0,
            mapping: RewriteMapping::new(),
            unsupported_stages: Vec::new(),
            asset_dir,
            document: None,
            extensions: None,
            render: None,
        }
    }
}

/// Run the pipeline for one report.
pub fn extract(
    options: &ExtractOptions,
    registry: &AdapterRegistry,
    renderer: &dyn Renderer,
    out: &OutputContext,
) -> Result<ExtractReport, ExtractError> {
    let report_file = options.report_file.as_path();
    let _span = info_span!("extract", report = %report_file.display()).entered();

    let format = DocumentFormat::from_path(report_file).ok_or_else(|| {
        ExtractError::UnsupportedFormat {
            path: report_file.to_path_buf(),
        }
    })?;
    let adapter = registry
        .resolve(format)
        .ok_or_else(|| ExtractError::UnsupportedFormat {
            path: report_file.to_path_buf(),
        })?;
    check_assets_dir(&options.assets_dir)?;

    let asset_dir = options.asset_dir();
    fs::create_dir_all(&asset_dir)
        .map_err(ExtractError::io("Failed to create output directory", &asset_dir))?;

    let _ = out.print_info(format!(
        "Processing {} file: {}",
        format.label(),
        report_file.display()
    ));

    let source = SourceDocument::load(report_file)?;
    let capabilities = adapter.capabilities();
    let mut report = ExtractReport::new(format, asset_dir.clone());
    report.unsupported_stages = capabilities.missing();

    // Extract
    let references = adapter.extract(source.content());
    report.candidates = references.len();
    info!(adapter = adapter.id(), count = references.len(), "extracted candidates");

    // Validate
    let (valid, invalid): (Vec<_>, Vec<_>) =
        validate(references, source.base_dir(), &options.extensions)
            .into_iter()
            .partition(|asset| asset.is_valid());
    report.valid = valid.len();
    for asset in invalid {
        let _ = out.print_warning(format!(
            "Invalid or unsupported path: {}",
            asset.source.display()
        ));
        report.skipped.push(asset.source);
    }

    // Copy
    let copier = AssetCopier::new(options.on_collision, options.extensions.clone());
    let outcomes = copier.copy(valid, source.base_dir(), &asset_dir)?;
    report.copied_references = outcomes.iter().filter_map(CopyOutcome::copied).count();
    for outcome in &outcomes {
        match outcome {
            CopyOutcome::Copied(copied) => {
                let _ = out.print_success(format!("Copied: {}", copied.asset.source.display()));
                report.copied.push(copied.clone());
            }
            CopyOutcome::Reused(copied) => {
                debug!(path = %copied.asset.source.display(), "already copied");
            }
            CopyOutcome::Skipped(asset) => {
                let _ = out.print_warning(format!(
                    "{} not found or unsupported extension.",
                    asset.source.display()
                ));
                report.skipped.push(asset.source.clone());
            }
        }
    }

    if !report.unsupported_stages.is_empty() {
        let stages: Vec<String> = report
            .unsupported_stages
            .iter()
            .map(ToString::to_string)
            .collect();
        info!(format = %format, stages = ?stages, "stages not supported for format");
        let _ = out.print_info(format!(
            "Skipping {} ({} documents are not rewritten)",
            stages.join(", "),
            format
        ));
    }

    // Rewrite
    if !capabilities.supports(Stage::Rewrite) {
        return Ok(report);
    }
    report.mapping = RewriteMapping::from_outcomes(&outcomes, &asset_dir);
    let rewritten = rewrite(source.content(), &report.mapping);
    info!(count = report.mapping.len(), "rewrote references");

    // Emit
    if !capabilities.supports(Stage::Emit) {
        return Ok(report);
    }
    let emitter = DocumentEmitter::for_asset_dir(&asset_dir);
    let document = emitter.write_document(&source, &rewritten)?;
    let _ = out.print_success(format!("Wrote: {}", document.display()));
    report.document = Some(document.clone());

    report.extensions = emitter.copy_extensions(&source)?;
    if let Some(extensions) = &report.extensions {
        let _ = out.print_success(format!("Copied: {}", extensions.display()));
    }

    // Render
    if !options.render {
        debug!("rendering disabled");
        return Ok(report);
    }
    let _ = out.print_info(format!("Rendering {} with {}", document.display(), renderer.name()));
    let outcome = renderer.render(&document)?;
    if !outcome.success() {
        if options.fail_on_render_error {
            return Err(ExtractError::RenderFailed {
                program: renderer.name().to_string(),
                exit_code: outcome.exit_code,
            });
        }
        let _ = out.print_warning(format!(
            "{} exited with {}",
            renderer.name(),
            outcome
                .exit_code
                .map(|code| format!("code {}", code))
                .unwrap_or_else(|| "a signal".to_string())
        ));
    }
    report.render = Some(outcome);

    Ok(report)
}

/// The asset directory must be one plain name so `<name>/<file>` resolves from the emitted document.
fn check_assets_dir(name: &str) -> Result<(), ExtractError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ExtractError::InvalidAssetsDir(name.to_string())),
    }
}
