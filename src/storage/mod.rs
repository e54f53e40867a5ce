//! Storage abstractions for cached assets.
//!
//! Cached posters are content-addressed: the file name is derived from the
//! source URL and title, so the store needs no metadata ledger. Files are only
//! ever added.
//!
//! ## Directory Structure
//!
//! ```text
//! public/images/douban/
//! ├── 0cc175b9c0f1b6a831c399e269772661.jpg
//! └── 92eb5ffee6ae2fec3ad71c777531578f.webp
//! ```

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Config;

// Re-export for convenience
pub use local::LocalAssetStore;
#[cfg(feature = "s3")]
pub use s3::S3AssetStore;

/// Trait for asset storage backends.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Whether an asset with this name is already stored.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Store an asset. Either the whole asset is stored or nothing is.
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Public reference for an asset, suitable for embedding in output.
    fn resolve(&self, name: &str) -> String;
}

/// Join a public prefix and an asset name with exactly one slash.
pub(crate) fn public_path(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

/// Build the asset store selected by the configuration.
pub async fn from_config(config: &Config) -> Result<Box<dyn AssetStore>> {
    match config.cache.backend {
        crate::models::CacheBackend::Local => Ok(Box::new(LocalAssetStore::new(
            &config.cache.asset_root,
            &config.cache.public_prefix,
        ))),
        #[cfg(feature = "s3")]
        crate::models::CacheBackend::S3 => Ok(Box::new(
            S3AssetStore::from_env(
                &config.cache.bucket,
                &config.cache.prefix,
                &config.cache.public_prefix,
            )
            .await?,
        )),
        #[cfg(not(feature = "s3"))]
        crate::models::CacheBackend::S3 => Err(crate::error::AppError::config(
            "cache.backend = \"s3\" requires the `s3` feature",
        )),
    }
}
