//! Writing the rewritten document and its extensions
//!
//! The rewritten report is written next to the asset directory, not inside it, so
//! the `<assets>/<file>` references it contains resolve from where it sits.

use super::format::SourceDocument;
use crate::errors::{self, ExtractError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the Quarto extensions directory copied alongside the report.
pub const EXTENSIONS_DIR: &str = "_extensions";

/// Writes emitted files under a root directory (the parent of the asset directory).
pub struct DocumentEmitter {
    root: PathBuf,
}

impl DocumentEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Emitter for an asset directory: files go to its parent.
    pub fn for_asset_dir(dest_dir: &Path) -> Self {
        let root = match dest_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `<root>/<source filename>` and return the new path.
    ///
    /// Fails rather than overwrite the source document itself.
    pub fn write_document(
        &self,
        source: &SourceDocument,
        content: &str,
    ) -> Result<PathBuf, ExtractError> {
        let file_name = source.file_name().ok_or_else(|| ExtractError::Io {
            action: "Document has no file name",
            path: source.path().to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        })?;
        let target = self.root.join(file_name);

        if same_file(&target, source.path()) {
            return Err(ExtractError::WouldOverwriteSource(target));
        }

        fs::write(&target, content).map_err(ExtractError::io("Failed to write document", &target))?;
        info!(path = %target.display(), bytes = content.len(), "wrote rewritten document");
        Ok(target)
    }

    /// Copy `_extensions` from beside the source document into the root.
    ///
    /// Returns `Ok(None)` when the source has no extensions directory. An existing
    /// destination is an error; directories are never merged.
    pub fn copy_extensions(&self, source: &SourceDocument) -> Result<Option<PathBuf>, ExtractError> {
        let from = source.base_dir().join(EXTENSIONS_DIR);
        if !from.is_dir() {
            debug!(path = %from.display(), "no extensions directory");
            return Ok(None);
        }

        let to = self.root.join(EXTENSIONS_DIR);
        if to.exists() {
            return Err(errors::extensions_exist(&to).into());
        }

        copy_dir_all(&from, &to)?;
        info!(from = %from.display(), to = %to.display(), "copied extensions");
        Ok(Some(to))
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Recursively copy `src` into `dest`, creating `dest` as needed.
///
/// Symlinks are copied as the files they point to.
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(dest).map_err(ExtractError::io("Failed to create directory", dest))?;

    let entries = fs::read_dir(src).map_err(ExtractError::io("Failed to read directory", src))?;
    for entry in entries {
        let entry = entry.map_err(ExtractError::io("Failed to read directory", src))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_all(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path)
                .map_err(ExtractError::io("Failed to copy file to", &dest_path))?;
        }
    }
    Ok(())
}
