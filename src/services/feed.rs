// src/services/feed.rs

//! Remote feed fetching.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{FeedConfig, FeedItem};
use crate::utils::http::get_following_redirects;

/// Redirect hops followed when fetching the feed document.
const FEED_MAX_REDIRECTS: usize = 5;

/// A source of raw feed items, in feed order.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<FeedItem>>;
}

/// Fetches and parses an RSS 2.0 feed over HTTP.
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Client for the configured user's interests feed.
    pub fn from_config(client: Client, config: &FeedConfig) -> Self {
        Self::new(client, config.url())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Parse an RSS document into feed items.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let channel = rss::Channel::read_from(bytes)?;
    Ok(channel.items().iter().map(FeedItem::from).collect())
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        log::info!("Fetching feed {}", self.url);
        let response =
            get_following_redirects(&self.client, &self.url, FEED_MAX_REDIRECTS, None).await?;
        let bytes = response.bytes().await?;

        let items = parse_feed(&bytes)?;
        log::info!("Feed returned {} items", items.len());
        Ok(items)
    }
}
