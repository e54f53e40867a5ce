//! Service layer for the feed pipeline.
//!
//! This module contains the business logic for:
//! - Feed fetching (`FeedClient`)
//! - Entry classification (`classify`)
//! - Body field extraction (`PatternExtractor`, `HtmlExtractor`)
//! - Poster caching (`AssetCache`)

pub mod assets;
pub mod classifier;
pub mod extractor;
pub mod feed;

pub use assets::AssetCache;
pub use classifier::{cache_context, classify, clean_title};
pub use extractor::{Extractor, HtmlExtractor, PatternExtractor, UNRATED};
pub use feed::{FeedClient, FeedSource};
