//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::slug::{self, SlugMode};

/// Root application configuration.
///
/// Constructed once per process and passed down explicitly; nothing in the
/// crate reads configuration from global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Feed source settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Poster cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Body markup extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Orchestration limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Slug generation settings
    #[serde(default)]
    pub slug: SlugConfig,

    /// Inbound HTTP endpoint settings
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.feed.user_id.trim().is_empty() {
            return Err(AppError::validation("feed.user_id is empty"));
        }
        if !self.feed.url_template.contains("{user_id}") {
            return Err(AppError::validation(
                "feed.url_template must contain {user_id}",
            ));
        }
        if self.feed.max_entries == 0 {
            return Err(AppError::validation("feed.max_entries must be > 0"));
        }
        if self.cache.timeout_secs == 0 {
            return Err(AppError::validation("cache.timeout_secs must be > 0"));
        }
        if self.cache.max_bytes == 0 {
            return Err(AppError::validation("cache.max_bytes must be > 0"));
        }
        if self.cache.asset_root.trim().is_empty() {
            return Err(AppError::validation("cache.asset_root is empty"));
        }
        if self.cache.backend == CacheBackend::S3 && self.cache.bucket.trim().is_empty() {
            return Err(AppError::validation(
                "cache.bucket is required for the s3 backend",
            ));
        }
        if self.pipeline.max_concurrent == 0 {
            return Err(AppError::validation("pipeline.max_concurrent must be > 0"));
        }
        if self.pipeline.timeout_secs == 0 {
            return Err(AppError::validation("pipeline.timeout_secs must be > 0"));
        }
        if !self.server.route.starts_with('/') {
            return Err(AppError::validation("server.route must start with '/'"));
        }
        Ok(())
    }
}

/// HTTP client settings shared by the feed fetch and poster downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Feed request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Feed source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Douban user whose interests feed is ingested
    #[serde(default)]
    pub user_id: String,

    /// Feed URL with a `{user_id}` placeholder
    #[serde(default = "defaults::url_template")]
    pub url_template: String,

    /// Number of raw feed items considered per run
    #[serde(default = "defaults::max_entries")]
    pub max_entries: usize,
}

impl FeedConfig {
    /// The feed URL for the configured user.
    pub fn url(&self) -> String {
        self.url_template.replace("{user_id}", self.user_id.trim())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            url_template: defaults::url_template(),
            max_entries: defaults::max_entries(),
        }
    }
}

/// Where cached posters are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Local,
    S3,
}

/// Poster cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: CacheBackend,

    /// Local directory holding cached files
    #[serde(default = "defaults::asset_root")]
    pub asset_root: String,

    /// Public path prefix embedded in output
    #[serde(default = "defaults::public_prefix")]
    pub public_prefix: String,

    /// Per-download timeout in seconds
    #[serde(default = "defaults::download_timeout")]
    pub timeout_secs: u64,

    /// Maximum redirect hops followed per download
    #[serde(default = "defaults::max_redirects")]
    pub max_redirects: usize,

    /// Largest image body accepted, in bytes
    #[serde(default = "defaults::max_bytes")]
    pub max_bytes: u64,

    /// Bucket name for the s3 backend
    #[serde(default)]
    pub bucket: String,

    /// Key prefix for the s3 backend
    #[serde(default = "defaults::s3_prefix")]
    pub prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            asset_root: defaults::asset_root(),
            public_prefix: defaults::public_prefix(),
            timeout_secs: defaults::download_timeout(),
            max_redirects: defaults::max_redirects(),
            max_bytes: defaults::max_bytes(),
            bucket: String::new(),
            prefix: defaults::s3_prefix(),
        }
    }
}

/// Which extractor reads entry bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Regex rules over the raw markup
    #[default]
    Pattern,
    /// HTML parse with CSS selectors
    Html,
}

/// Body markup extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub mode: ExtractionMode,
}

/// Orchestration limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Entries processed concurrently (output order is preserved)
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Deadline for a whole run in seconds
    #[serde(default = "defaults::pipeline_timeout")]
    pub timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            timeout_secs: defaults::pipeline_timeout(),
        }
    }
}

/// Slug generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlugConfig {
    #[serde(default)]
    pub mode: SlugMode,
}

impl SlugConfig {
    /// Slug for `id` under the configured mode.
    pub fn slug(&self, id: &str) -> String {
        slug::id_to_slug(id, self.mode)
    }
}

/// Inbound HTTP endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "defaults::bind")]
    pub bind: String,

    /// Route serving the grouped result
    #[serde(default = "defaults::route")]
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
            route: defaults::route(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; douban-feed/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Feed defaults
    pub fn url_template() -> String {
        "https://www.douban.com/feed/people/{user_id}/interests".into()
    }
    pub fn max_entries() -> usize {
        20
    }

    // Cache defaults
    pub fn asset_root() -> String {
        "public/images/douban".into()
    }
    pub fn public_prefix() -> String {
        "/images/douban".into()
    }
    pub fn download_timeout() -> u64 {
        10
    }
    pub fn max_redirects() -> usize {
        5
    }
    pub fn max_bytes() -> u64 {
        20 * 1024 * 1024
    }
    pub fn s3_prefix() -> String {
        "images/douban".into()
    }

    // Pipeline defaults
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn pipeline_timeout() -> u64 {
        120
    }

    // Server defaults
    pub fn bind() -> String {
        "127.0.0.1:4321".into()
    }
    pub fn route() -> String {
        "/api/douban".into()
    }
}
