//! Document handling for media extraction
//!
//! Each stage of the pipeline lives in its own module: format adapters pull
//! candidate references out of the text, the resolver validates them against the
//! filesystem, the copier flattens them into the asset directory, the rewriter
//! points the text at the copies and the emitter writes the result out.

mod adapter;
mod copy;
mod emit;
mod format;
mod reference;
mod resolve;
mod rewrite;

#[cfg(test)]
mod rewrite_proptests;

pub use adapter::{
    AdapterRegistry, Capabilities, FormatAdapter, LatexAdapter, MarkdownAdapter, QuartoAdapter,
    Stage,
};
pub use copy::{AssetCopier, CollisionPolicy, CopiedAsset, CopyOutcome};
pub use emit::{copy_dir_all, DocumentEmitter, EXTENSIONS_DIR};
pub use format::{DocumentFormat, SourceDocument};
pub use reference::{ExtractionRule, MediaReference};
pub use resolve::{is_valid, resolve, validate, MediaExtensions, ResolvedAsset};
pub use rewrite::{replace_literal, rewrite, RewriteEntry, RewriteMapping};
