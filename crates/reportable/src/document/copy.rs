//! Asset copying with destination flattening
//!
//! Every asset lands directly in the destination directory under its own
//! filename; the directory structure it came from is discarded. When two
//! distinct sources share a filename the [`CollisionPolicy`] decides what happens.

use super::resolve::{is_valid, resolve, MediaExtensions, ResolvedAsset};
use crate::errors::ExtractError;
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What to do when a second, distinct source maps to a filename already used in this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The later file replaces the earlier one
    #[default]
    Overwrite,
    /// The later file is stored as `<stem>-<n>.<ext>`
    Rename,
    /// Abort the run
    Error,
}

/// A validated asset and the place it was copied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedAsset {
    pub asset: ResolvedAsset,
    pub destination: PathBuf,
}

impl CopiedAsset {
    /// Final filename inside the destination directory.
    pub fn file_name(&self) -> &OsStr {
        self.destination.file_name().unwrap_or_default()
    }
}

/// Result of handling one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The file was copied
    Copied(CopiedAsset),
    /// The same source was already copied earlier in this run
    Reused(CopiedAsset),
    /// The asset failed re-validation and was not copied
    Skipped(ResolvedAsset),
}

impl CopyOutcome {
    pub fn copied(&self) -> Option<&CopiedAsset> {
        match self {
            CopyOutcome::Copied(copied) | CopyOutcome::Reused(copied) => Some(copied),
            CopyOutcome::Skipped(_) => None,
        }
    }
}

/// Copies validated assets into a flat destination directory.
pub struct AssetCopier {
    policy: CollisionPolicy,
    extensions: MediaExtensions,
}

impl AssetCopier {
    pub fn new(policy: CollisionPolicy, extensions: MediaExtensions) -> Self {
        Self { policy, extensions }
    }

    /// Copy each asset to `dest_dir/<filename>`.
    ///
    /// Each asset is resolved against `base_dir` and checked again before copying;
    /// one that no longer validates is reported as skipped and the rest continue.
    /// Filesystem errors abort the whole batch, leaving earlier copies in place.
    pub fn copy(
        &self,
        assets: Vec<ResolvedAsset>,
        base_dir: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<CopyOutcome>, ExtractError> {
        let mut claimed: HashMap<OsString, PathBuf> = HashMap::new();
        let mut by_source: HashMap<PathBuf, PathBuf> = HashMap::new();
        let mut outcomes = Vec::with_capacity(assets.len());

        for asset in assets {
            let source = resolve(&asset.reference.raw, base_dir);
            if !is_valid(&source, &self.extensions) {
                warn!(path = %source.display(), "media vanished or became invalid before copy");
                outcomes.push(CopyOutcome::Skipped(asset));
                continue;
            }

            // Reuse only while no other source has overwritten the destination since
            if let Some(destination) = by_source.get(&source) {
                let current = destination.file_name().and_then(|name| claimed.get(name));
                if current == Some(&source) {
                    outcomes.push(CopyOutcome::Reused(CopiedAsset {
                        asset,
                        destination: destination.clone(),
                    }));
                    continue;
                }
            }

            let Some(name) = Path::new(&asset.reference.raw)
                .file_name()
                .or_else(|| source.file_name())
                .map(OsStr::to_os_string)
            else {
                outcomes.push(CopyOutcome::Skipped(asset));
                continue;
            };

            let name = match claimed.get(&name) {
                Some(previous) if *previous != source => {
                    self.on_collision(&name, previous, &source, &claimed, dest_dir)?
                }
                _ => name,
            };

            let destination = dest_dir.join(&name);
            fs::copy(&source, &destination)
                .map_err(ExtractError::io("Failed to copy media to", &destination))?;
            debug!(
                from = %source.display(),
                to = %destination.display(),
                "copied media"
            );

            claimed.insert(name, source.clone());
            by_source.insert(source, destination.clone());
            outcomes.push(CopyOutcome::Copied(CopiedAsset { asset, destination }));
        }

        Ok(outcomes)
    }

    /// Pick the filename for `source` when `name` is already taken by `previous`.
    fn on_collision(
        &self,
        name: &OsStr,
        previous: &Path,
        source: &Path,
        claimed: &HashMap<OsString, PathBuf>,
        dest_dir: &Path,
    ) -> Result<OsString, ExtractError> {
        match self.policy {
            CollisionPolicy::Overwrite => {
                warn!(
                    file = %name.to_string_lossy(),
                    replaced = %previous.display(),
                    by = %source.display(),
                    "destination collision, overwriting"
                );
                Ok(name.to_os_string())
            }
            CollisionPolicy::Rename => {
                let renamed = free_name(name, claimed);
                debug!(
                    file = %name.to_string_lossy(),
                    renamed = %renamed.to_string_lossy(),
                    "destination collision, renaming"
                );
                Ok(renamed)
            }
            CollisionPolicy::Error => Err(ExtractError::Collision {
                destination: dest_dir.join(name),
                first: previous.to_path_buf(),
                second: source.to_path_buf(),
            }),
        }
    }
}

/// Smallest `<stem>-<n>.<ext>` with `n >= 1` not yet claimed in this run.
fn free_name(name: &OsStr, claimed: &HashMap<OsString, PathBuf>) -> OsString {
    let path = Path::new(name);
    let stem = path.file_stem().unwrap_or(name).to_string_lossy();
    let extension = path.extension().map(|ext| ext.to_string_lossy());

    (1..)
        .map(|n| match &extension {
            Some(ext) => OsString::from(format!("{}-{}.{}", stem, n, ext)),
            None => OsString::from(format!("{}-{}", stem, n)),
        })
        .find(|candidate| !claimed.contains_key(candidate))
        .unwrap_or_else(|| name.to_os_string())
}
