// src/services/assets.rs

//! Content-addressed poster cache.
//!
//! A poster is stored under `md5(source_url + context)` plus the extension of
//! the source path. The name alone decides whether a download is needed, so
//! repeated runs never fetch the same poster twice.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use md5::{Digest, Md5};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::CacheConfig;
use crate::storage::AssetStore;
use crate::utils::http::get_following_redirects;
use crate::utils::url::file_extension;

/// Downloads remote images into an [`AssetStore`] at most once.
pub struct AssetCache {
    client: Client,
    store: Arc<dyn AssetStore>,
    timeout: Duration,
    max_redirects: usize,
    max_bytes: u64,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AssetCache {
    /// Create a cache over `store` using the shared HTTP client.
    pub fn new(client: Client, store: Arc<dyn AssetStore>, config: &CacheConfig) -> Self {
        Self {
            client,
            store,
            timeout: Duration::from_secs(config.timeout_secs),
            max_redirects: config.max_redirects,
            max_bytes: config.max_bytes,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Override the per-download timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the largest accepted image body.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// File name for a source URL and its title context.
    pub fn asset_name(source_url: &str, context: &str) -> Result<String> {
        let mut hasher = Md5::new();
        hasher.update(source_url.as_bytes());
        hasher.update(context.as_bytes());
        let hash = hex::encode(hasher.finalize());
        Ok(format!("{hash}{}", file_extension(source_url)?))
    }

    /// Make sure the image at `source_url` is stored and return its public
    /// path.
    ///
    /// An already stored asset is returned without touching the network.
    /// Otherwise the image is downloaded, following a bounded number of
    /// redirects, and written in one piece; a failed download leaves nothing
    /// behind.
    pub async fn store(&self, source_url: &str, context: &str) -> Result<String> {
        let name = Self::asset_name(source_url, context)?;

        let lock = self.lock_for(&name).await;
        let result = {
            let _guard = lock.lock().await;
            self.store_locked(source_url, &name).await
        };
        drop(lock);
        self.release(&name).await;

        result
    }

    async fn store_locked(&self, source_url: &str, name: &str) -> Result<String> {
        if self.store.exists(name).await? {
            log::debug!("Cache hit for {} ({})", source_url, name);
            return Ok(self.store.resolve(name));
        }

        let bytes = self.download(source_url).await?;
        self.store.write(name, &bytes).await?;
        log::info!("Cached {} as {} ({} bytes)", source_url, name, bytes.len());

        Ok(self.store.resolve(name))
    }

    /// Read the image body, refusing anything over `max_bytes`.
    async fn download(&self, source_url: &str) -> Result<Vec<u8>> {
        let mut response = get_following_redirects(
            &self.client,
            source_url,
            self.max_redirects,
            Some(self.timeout),
        )
        .await?;

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(self.too_large(source_url));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AppError::download(source_url, e))?
        {
            if (bytes.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large(source_url));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    fn too_large(&self, source_url: &str) -> AppError {
        AppError::download(
            source_url,
            format!("body exceeds {} bytes", self.max_bytes),
        )
    }

    /// Per-name lock so concurrent requests for one asset do not interleave.
    async fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        Arc::clone(in_flight.entry(name.to_string()).or_default())
    }

    /// Drop the lock entry once nobody else holds it.
    async fn release(&self, name: &str) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(name)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            in_flight.remove(name);
        }
    }
}
