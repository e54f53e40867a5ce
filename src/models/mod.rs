// src/models/mod.rs

//! Domain models for the feed pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entry;
mod grouped;

// Re-export all public types
pub use config::{
    CacheBackend, CacheConfig, Config, ExtractionConfig, ExtractionMode, FeedConfig, HttpConfig,
    PipelineConfig, ServerConfig, SlugConfig,
};
pub use entry::{Category, Classification, ExtractedEntry, FeedItem, Status};
pub use grouped::{BookGroups, FeedSnapshot, GameGroups, GroupedResult, MovieGroups};
