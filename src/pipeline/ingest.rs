// src/pipeline/ingest.rs

//! Feed ingestion: fetch → classify → extract → cache posters → group.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, ExtractedEntry, FeedItem, GroupedResult};
use crate::services::extractor::{self, Extractor};
use crate::services::{AssetCache, FeedClient, FeedSource, cache_context, classify};
use crate::storage;
use crate::utils::http::create_async_client;

/// Everything one run needs, built once and reused across runs.
pub struct Pipeline {
    config: Config,
    feed: Box<dyn FeedSource>,
    cache: AssetCache,
    extractor: Box<dyn Extractor>,
}

impl Pipeline {
    /// Assemble a pipeline from explicit parts.
    pub fn new(
        config: Config,
        feed: Box<dyn FeedSource>,
        cache: AssetCache,
        extractor: Box<dyn Extractor>,
    ) -> Self {
        Self {
            config,
            feed,
            cache,
            extractor,
        }
    }

    /// Build the production pipeline described by `config`.
    pub async fn from_config(config: Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        let store: Arc<dyn storage::AssetStore> = Arc::from(storage::from_config(&config).await?);
        let cache = AssetCache::new(client.clone(), store, &config.cache);
        let feed = FeedClient::from_config(client, &config.feed);
        log::info!("Feed source: {}", feed.url());
        let extractor = extractor::for_mode(config.extraction.mode);

        Ok(Self::new(config, Box::new(feed), cache, extractor))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run once and return the grouped entries.
    pub async fn run(&self) -> Result<GroupedResult> {
        run_pipeline(
            &self.config,
            self.feed.as_ref(),
            &self.cache,
            self.extractor.as_ref(),
        )
        .await
    }
}

/// Run the feed pipeline under the configured deadline.
///
/// Fails with [`AppError::NotFound`] when the feed is empty, and with
/// transport or parse errors from the feed fetch. Per-entry problems never
/// fail the run: unclassifiable entries are skipped and posters that cannot
/// be cached keep their remote URL.
pub async fn run_pipeline(
    config: &Config,
    feed: &dyn FeedSource,
    cache: &AssetCache,
    extractor: &dyn Extractor,
) -> Result<GroupedResult> {
    let deadline = config.pipeline.timeout_secs;
    tokio::time::timeout(
        Duration::from_secs(deadline),
        ingest(config, feed, cache, extractor),
    )
    .await
    .map_err(|_| AppError::Timeout(deadline))?
}

async fn ingest(
    config: &Config,
    feed: &dyn FeedSource,
    cache: &AssetCache,
    extractor: &dyn Extractor,
) -> Result<GroupedResult> {
    let items = feed.fetch().await?;
    if items.is_empty() {
        return Err(AppError::NotFound);
    }

    let total = items.len();
    let limit = config.feed.max_entries;
    if total > limit {
        log::info!("Processing the first {} of {} feed items", limit, total);
    }

    // `buffered` keeps arrival order while entries are processed concurrently.
    let entries: Vec<ExtractedEntry> = stream::iter(items.into_iter().take(limit))
        .map(|item| process_item(item, cache, extractor))
        .buffered(config.pipeline.max_concurrent.max(1))
        .filter_map(|entry| async move { entry })
        .collect()
        .await;

    log::info!("Extracted {} of {} entries", entries.len(), total.min(limit));
    Ok(GroupedResult::from_entries(entries))
}

/// Classify, extract and cache the poster of a single item.
///
/// Returns `None` when the title carries no status marker.
pub async fn process_item(
    item: FeedItem,
    cache: &AssetCache,
    extractor: &dyn Extractor,
) -> Option<ExtractedEntry> {
    let Some(classification) = classify(&item.title) else {
        log::debug!("Skipping unclassified entry: {}", item.title);
        return None;
    };

    let mut entry = extractor.extract(&item, classification);

    if !entry.poster.is_empty() {
        let context = cache_context(&item.title);
        match cache.store(&entry.poster, &context).await {
            Ok(local) => entry.poster = local,
            Err(e) => log::warn!(
                "Keeping remote poster for '{}' ({}): {}",
                entry.title,
                entry.poster,
                e
            ),
        }
    }

    Some(entry)
}
