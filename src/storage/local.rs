//! Local filesystem asset store.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {md5}.jpg             # Cached poster
//! └── {md5}.jpg.tmp         # In-flight write, renamed on success
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;

use crate::error::{AppError, Result};
use crate::storage::{AssetStore, public_path};

/// Local filesystem storage backend.
pub struct LocalAssetStore {
    root_dir: PathBuf,
    public_prefix: String,
    root_ready: OnceCell<()>,
}

impl LocalAssetStore {
    /// Create a store rooted at `root_dir`, publishing under `public_prefix`.
    pub fn new(root_dir: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            public_prefix: public_prefix.into(),
            root_ready: OnceCell::new(),
        }
    }

    /// Filesystem path for an asset name.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    /// Create the root directory once, on first write.
    async fn ensure_root(&self) -> Result<()> {
        self.root_ready
            .get_or_try_init(|| async {
                tokio::fs::create_dir_all(&self.root_dir).await?;
                log::debug!("Asset root ready at {}", self.root_dir.display());
                Ok::<(), AppError>(())
            })
            .await?;
        Ok(())
    }

    async fn write_tmp(tmp: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Temp file path that is removed on drop unless kept.
///
/// Covers error returns and futures dropped mid-write (deadline, client
/// disconnect) alike.
struct TmpFile {
    path: PathBuf,
    armed: bool,
}

impl TmpFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// The file was renamed into place; nothing to clean up.
    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for TmpFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove partial file {}: {}", self.path.display(), e);
            }
        }
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn exists(&self, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path(name)).await?)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_root().await?;

        let path = self.path(name);
        let tmp = TmpFile::new(self.path(&format!("{name}.tmp")));

        Self::write_tmp(tmp.path(), bytes).await?;
        tokio::fs::rename(tmp.path(), &path).await?;
        tmp.keep();
        Ok(())
    }

    fn resolve(&self, name: &str) -> String {
        public_path(&self.public_prefix, name)
    }
}
