// src/error.rs

//! Unified error handling for the feed pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Object storage error
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (network error or timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote answered with a status other than 200
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// Redirect chain exceeded the configured hop limit
    #[error("Too many redirects ({hops}) starting at {url}")]
    TooManyRedirects { url: String, hops: usize },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Feed document could not be parsed
    #[error("Feed parse error: {0}")]
    Feed(#[from] rss::Error),

    /// The feed contained no entries
    #[error("No entries found")]
    NotFound,

    /// The pipeline did not finish within its deadline
    #[error("Pipeline timed out after {0}s")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Asset download error
    #[error("Download error for {context}: {message}")]
    Download { context: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a download error with context.
    pub fn download(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Download {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a non-200 status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Whether this error means "the feed had nothing in it".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
