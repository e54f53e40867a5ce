// src/lib.rs

//! Douban feed ingestion library.
//!
//! Fetches a user's interests feed, classifies entries by status marker,
//! caches poster images locally and groups the result by category and
//! status.

pub mod config;
pub mod error;
#[cfg(feature = "server")]
pub mod handler;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
