//! Filesystem-backed URI resolution.

use std::fs;
use std::path::{Component, Path, PathBuf};

use gltf_core::FetchError;
use gltf_loader::UriResolver;
use percent_encoding::percent_decode_str;
use tracing::debug;

/// Resolves relative buffer URIs against the directory of the document.
#[derive(Debug, Clone)]
pub struct FileResolver {
    base: PathBuf,
}

impl FileResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolver rooted at the directory containing `document`.
    pub fn for_document(document: &Path) -> Self {
        let base = document
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(base)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl UriResolver for FileResolver {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        if uri.contains("://") {
            return Err(FetchError::Unsupported {
                uri: uri.to_string(),
            });
        }
        let decoded = percent_decode_str(uri)
            .decode_utf8()
            .map_err(|e| FetchError::Unavailable {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
        let relative = Path::new(decoded.as_ref());
        if escapes_base(relative) {
            return Err(FetchError::OutsideBase {
                uri: uri.to_string(),
            });
        }
        let path = self.base.join(relative);
        debug!(path = %path.display(), "reading external buffer");
        fs::read(&path).map_err(|e| FetchError::Unavailable {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Whether `path` is absolute or climbs above its starting directory.
fn escapes_base(path: &Path) -> bool {
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return true,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(up) => depth = up,
                None => return true,
            },
            Component::Normal(_) => depth += 1,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mesh.bin"), [1u8, 2, 3]).unwrap();
        let resolver = FileResolver::new(dir.path());
        assert_eq!(resolver.fetch("mesh.bin").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FileResolver::new(dir.path());
        assert!(matches!(
            resolver.fetch("missing.bin"),
            Err(FetchError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_percent_encoded_uri() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("mesh data")).unwrap();
        fs::write(dir.path().join("mesh data").join("my mesh.bin"), [7u8]).unwrap();
        let resolver = FileResolver::new(dir.path());
        assert_eq!(resolver.fetch("mesh%20data/my%20mesh.bin").unwrap(), vec![7]);
    }

    #[test]
    fn test_paths_outside_base_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = FileResolver::new(dir.path().join("assets"));
        for uri in ["../secret.bin", "a/../../secret.bin", "%2E%2E/secret.bin", "/etc/passwd"] {
            assert!(
                matches!(resolver.fetch(uri), Err(FetchError::OutsideBase { .. })),
                "{} should be rejected",
                uri
            );
        }
    }

    #[test]
    fn test_parent_within_base_allowed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("mesh.bin"), [1u8]).unwrap();
        let resolver = FileResolver::new(dir.path());
        assert_eq!(resolver.fetch("sub/../mesh.bin").unwrap(), vec![1]);
    }

    #[test]
    fn test_remote_uri_unsupported() {
        let resolver = FileResolver::new(".");
        assert!(matches!(
            resolver.fetch("https://example.com/mesh.bin"),
            Err(FetchError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_for_document_uses_parent() {
        let resolver = FileResolver::for_document(Path::new("assets/scene.gltf"));
        assert_eq!(resolver.base(), Path::new("assets"));
    }
}
