// src/services/classifier.rs

//! Entry classification from status markers in feed titles.
//!
//! Douban titles lead with a two-character status marker ("想看", "在读",
//! "玩过", ...). The marker decides both the category and the status.

use crate::models::{Category, Classification, Status};

/// Every character that appears in a status marker.
const MARKER_CHARS: [char; 6] = ['在', '看', '过', '想', '读', '玩'];

/// Families in the order they are tested.
const FAMILIES: [Category; 3] = [Category::Movie, Category::Book, Category::Game];

/// Classify a feed title by its status marker.
///
/// Families are tested movie, book, game; within a family the in-progress
/// marker wins over the done marker, which wins over the wanted marker.
/// Returns `None` when no marker is present; such entries are skipped.
pub fn classify(title: &str) -> Option<Classification> {
    FAMILIES.iter().find_map(|category| {
        category
            .statuses()
            .into_iter()
            .find(|status| title.contains(status.marker()))
            .map(Classification::new)
    })
}

/// Display title: one leading marker token removed, then trimmed.
pub fn clean_title(title: &str) -> String {
    let stripped = Status::ALL
        .iter()
        .find_map(|status| title.strip_prefix(status.marker()))
        .unwrap_or(title);
    stripped.trim().to_string()
}

/// Cache context for a title: every marker character removed, then trimmed.
///
/// This is what poster file names are derived from, so it has to stay
/// stable for already-cached files to be reused.
pub fn cache_context(title: &str) -> String {
    title
        .chars()
        .filter(|c| !MARKER_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}
