//! Bundled asset loading (pin icons).

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::AssetError;
use crate::surface::BoxFuture;

/// Resolves a logical asset path (e.g. `assets/pin.png`) to its bytes.
pub trait AssetSource: Send + Sync {
    fn load(&self, path: &str) -> BoxFuture<'_, Result<Bytes, AssetError>>;
}

/// Assets read from a directory on disk.
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Map a logical path onto the asset root. Absolute paths and `..` are
    /// refused so a logical path can never escape the root.
    fn resolve(&self, logical: &str) -> Result<PathBuf, AssetError> {
        let rel = Path::new(logical);
        if logical.is_empty() {
            return Err(AssetError::new(logical, "empty asset path"));
        }
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(AssetError::new(logical, "asset path escapes asset root"));
        }
        Ok(self.root.join(rel))
    }
}

impl AssetSource for FsAssets {
    fn load(&self, path: &str) -> BoxFuture<'_, Result<Bytes, AssetError>> {
        let logical = path.to_string();
        Box::pin(async move {
            let file = self.resolve(&logical)?;
            match tokio::fs::read(&file).await {
                Ok(data) => Ok(Bytes::from(data)),
                Err(err) => Err(AssetError::with_source(logical, "read failed", err)),
            }
        })
    }
}

/// In-memory assets, keyed by logical path.
#[derive(Default)]
pub struct MemoryAssets {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, path: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn insert(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.entries.write().insert(path.into(), data.into());
    }

    pub fn remove(&self, path: &str) -> Option<Bytes> {
        self.entries.write().remove(path)
    }
}

impl AssetSource for MemoryAssets {
    fn load(&self, path: &str) -> BoxFuture<'_, Result<Bytes, AssetError>> {
        let found = self.entries.read().get(path).cloned();
        let path = path.to_string();
        Box::pin(async move { found.ok_or_else(|| AssetError::new(path, "not bundled")) })
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetSource, FsAssets, MemoryAssets};

    #[tokio::test]
    async fn fs_assets_reads_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/pin.png"), b"\x89PNG").unwrap();

        let assets = FsAssets::new(dir.path());
        let bytes = assets.load("assets/pin.png").await.unwrap();
        assert_eq!(&bytes[..], b"\x89PNG");
    }

    #[tokio::test]
    async fn fs_assets_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let assets = FsAssets::new(dir.path());
        let err = assets.load("assets/none.png").await.unwrap_err();
        assert_eq!(err.path, "assets/none.png");
    }

    #[tokio::test]
    async fn fs_assets_refuses_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let assets = FsAssets::new(dir.path().join("bundle"));
        for bad in ["../secret", "assets/../../x", "/etc/passwd", ""] {
            assert!(assets.load(bad).await.is_err(), "{bad} should be refused");
        }
    }

    #[tokio::test]
    async fn memory_assets_round_trip() {
        let assets = MemoryAssets::new().with("assets/pin.png", vec![1u8, 2, 3]);
        assert_eq!(&assets.load("assets/pin.png").await.unwrap()[..], &[1, 2, 3]);
        assert!(assets.load("assets/other.png").await.is_err());

        assets.remove("assets/pin.png");
        assert!(assets.load("assets/pin.png").await.is_err());
    }
}
