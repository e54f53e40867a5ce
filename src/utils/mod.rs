//! Utility functions and helpers.

pub mod http;
pub mod slug;
pub mod url;

pub use slug::{SlugMode, id_to_slug, index_from_slug_id};
