//! Path resolution and validation
//!
//! References are resolved against the source document's directory and kept only
//! when they name an existing file with a supported media extension. Nothing in
//! here fails: an unresolvable reference is simply invalid.

use super::reference::MediaReference;
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Extensions accepted when no configuration overrides them.
pub const DEFAULT_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "svg", "mp4", "mp3", "wav"];

/// The set of supported media extensions, stored lower-case without the dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaExtensions {
    extensions: BTreeSet<String>,
}

impl MediaExtensions {
    /// Build a set from configured values. `".PNG"`, `"png"` and `"Png"` are the same entry.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// Whether `path` carries one of the supported extensions (case-insensitive).
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

impl Default for MediaExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// A reference paired with its resolved location and verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub reference: MediaReference,
    /// Absolute, normalized source path
    pub source: PathBuf,
    valid: bool,
}

impl ResolvedAsset {
    /// True when the extension is supported and the file existed at resolution time.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Resolve a reference against `base_dir`.
///
/// Absolute paths are normalized as-is; relative ones are joined to `base_dir`
/// first. Existing paths are canonicalized so symlinks resolve the way the host
/// filesystem sees them. Paths that don't exist are normalized lexically.
pub fn resolve(path: &str, base_dir: &Path) -> PathBuf {
    let candidate = Path::new(path);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base_dir.join(candidate)
    };

    joined
        .canonicalize()
        .unwrap_or_else(|_| normalize_path(&joined))
}

/// True iff `path` has a supported extension and is an existing regular file.
pub fn is_valid(path: &Path, extensions: &MediaExtensions) -> bool {
    extensions.matches(path) && path.is_file()
}

/// Resolve and classify every reference, keeping document order.
pub fn validate(
    references: Vec<MediaReference>,
    base_dir: &Path,
    extensions: &MediaExtensions,
) -> Vec<ResolvedAsset> {
    references
        .into_iter()
        .map(|reference| {
            let source = resolve(&reference.raw, base_dir);
            let valid = is_valid(&source, extensions);
            debug!(
                raw = %reference.raw,
                rule = %reference.rule,
                path = %source.display(),
                valid,
                "resolved media reference"
            );
            ResolvedAsset {
                reference,
                source,
                valid,
            }
        })
        .collect()
}

/// Normalize a path by resolving `.` and `..` components.
///
/// `..` never climbs above the root or a prefix.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }
    components.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ExtractionRule;
    use std::fs;
    use tempfile::TempDir;

    fn reference(raw: &str) -> MediaReference {
        MediaReference::new(raw, 0..raw.len(), ExtractionRule::MarkdownImage)
    }

    fn base(temp: &TempDir) -> PathBuf {
        temp.path().canonicalize().unwrap()
    }

    #[test]
    fn test_resolve_relative_existing() {
        let temp = TempDir::new().unwrap();
        let base = base(&temp);
        fs::create_dir(base.join("img")).unwrap();
        fs::write(base.join("img/a.png"), b"png").unwrap();

        assert_eq!(resolve("./img/a.png", &base), base.join("img/a.png"));
        assert_eq!(resolve("img/../img/a.png", &base), base.join("img/a.png"));
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let temp = TempDir::new().unwrap();
        let base = base(&temp);
        fs::write(base.join("logo.svg"), b"<svg/>").unwrap();

        let absolute = base.join("logo.svg");
        let resolved = resolve(absolute.to_str().unwrap(), Path::new("/somewhere/else"));
        assert_eq!(resolved, absolute);
    }

    #[test]
    fn test_resolve_missing_is_normalized_lexically() {
        let base = Path::new("/reports/2024");
        assert_eq!(
            resolve("../shared/./missing.png", base),
            PathBuf::from("/reports/shared/missing.png")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlinks() {
        let temp = TempDir::new().unwrap();
        let base = base(&temp);
        fs::write(base.join("real.png"), b"png").unwrap();
        std::os::unix::fs::symlink(base.join("real.png"), base.join("link.png")).unwrap();

        assert_eq!(resolve("link.png", &base), base.join("real.png"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("./file.md")),
            PathBuf::from("file.md")
        );
        assert_eq!(normalize_path(Path::new("a/./b")), PathBuf::from("a/b"));
        assert_eq!(normalize_path(Path::new("a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_is_valid_requires_extension_and_file() {
        let temp = TempDir::new().unwrap();
        let base = base(&temp);
        let extensions = MediaExtensions::default();

        fs::write(base.join("diagram.png"), b"png").unwrap();
        fs::write(base.join("PHOTO.JPG"), b"jpg").unwrap();
        fs::write(base.join("notes.txt"), b"text").unwrap();
        fs::create_dir(base.join("folder.png")).unwrap();

        assert!(is_valid(&base.join("diagram.png"), &extensions));
        assert!(is_valid(&base.join("PHOTO.JPG"), &extensions));
        assert!(!is_valid(&base.join("notes.txt"), &extensions));
        assert!(!is_valid(&base.join("missing.svg"), &extensions));
        assert!(!is_valid(&base.join("folder.png"), &extensions));
        assert!(!is_valid(&base.join("no_extension"), &extensions));
    }

    #[test]
    fn test_every_default_extension_is_accepted() {
        let temp = TempDir::new().unwrap();
        let base = base(&temp);
        let extensions = MediaExtensions::default();

        for ext in DEFAULT_EXTENSIONS {
            let path = base.join(format!("media.{}", ext));
            assert!(!is_valid(&path, &extensions), "{} should not exist yet", ext);
            fs::write(&path, b"bytes").unwrap();
            assert!(is_valid(&path, &extensions), "{} should be valid", ext);
        }
    }

    #[test]
    fn test_media_extensions_normalizes_config_values() {
        let extensions = MediaExtensions::new([".PNG", " webp ", "", "."]);
        assert_eq!(extensions.iter().collect::<Vec<_>>(), vec!["png", "webp"]);
        assert!(extensions.matches(Path::new("a.Png")));
        assert!(extensions.matches(Path::new("b.webp")));
        assert!(!extensions.matches(Path::new("c.gif")));
    }

    #[test]
    fn test_validate_filters_candidates() {
        let temp = TempDir::new().unwrap();
        let base = base(&temp);
        fs::write(base.join("notes.txt"), b"text").unwrap();
        fs::write(base.join("diagram.png"), b"png").unwrap();

        let references = ["notes.txt", "diagram.png", "missing.svg"]
            .into_iter()
            .map(reference)
            .collect();
        let resolved = validate(references, &base, &MediaExtensions::default());

        assert_eq!(resolved.len(), 3);
        let valid: Vec<_> = resolved
            .iter()
            .filter(|a| a.is_valid())
            .map(|a| a.reference.raw.as_str())
            .collect();
        assert_eq!(valid, vec!["diagram.png"]);
        assert_eq!(resolved[1].source, base.join("diagram.png"));
    }
}
