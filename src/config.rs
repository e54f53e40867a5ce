// src/config.rs

//! Configuration loading utilities.
//!
//! The TOML file is optional; missing keys take their defaults and a handful
//! of environment variables override the file.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::slug::SlugMode;

/// Douban user whose feed is ingested.
pub const ENV_USER_ID: &str = "DOUBAN_USER_ID";
/// Slug mode: `RAW`, `HASH` or `PINYIN`.
pub const ENV_SLUG_MODE: &str = "SLUG_MODE";
/// Poster cache directory.
pub const ENV_ASSET_ROOT: &str = "ASSET_ROOT";
/// Poster download timeout in seconds.
pub const ENV_FETCH_TIMEOUT: &str = "FETCH_TIMEOUT_SECS";
/// Per-item concurrency.
pub const ENV_MAX_CONCURRENT: &str = "MAX_CONCURRENT";

/// Load configuration from `path` and apply environment overrides.
///
/// A missing or unreadable file falls back to defaults; a malformed override
/// is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from `lookup`. Empty values are ignored.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(user_id) = get(ENV_USER_ID) {
        config.feed.user_id = user_id.trim().to_string();
    }
    if let Some(mode) = get(ENV_SLUG_MODE) {
        config.slug.mode = mode.parse::<SlugMode>()?;
    }
    if let Some(root) = get(ENV_ASSET_ROOT) {
        config.cache.asset_root = root;
    }
    if let Some(secs) = get(ENV_FETCH_TIMEOUT) {
        config.cache.timeout_secs = parse_number(ENV_FETCH_TIMEOUT, &secs)?;
    }
    if let Some(n) = get(ENV_MAX_CONCURRENT) {
        config.pipeline.max_concurrent = parse_number(ENV_MAX_CONCURRENT, &n)?;
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{key} must be a number, got '{value}'")))
}
