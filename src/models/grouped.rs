//! Grouped pipeline output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::{ExtractedEntry, Status};

/// Movie entries by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MovieGroups {
    pub watching: Vec<ExtractedEntry>,
    pub watched: Vec<ExtractedEntry>,
    pub want_to_watch: Vec<ExtractedEntry>,
}

/// Book entries by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookGroups {
    pub reading: Vec<ExtractedEntry>,
    pub read: Vec<ExtractedEntry>,
    pub want_to_read: Vec<ExtractedEntry>,
}

/// Game entries by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameGroups {
    pub playing: Vec<ExtractedEntry>,
    pub played: Vec<ExtractedEntry>,
    pub want_to_play: Vec<ExtractedEntry>,
}

/// Entries keyed by category, then status, in feed arrival order.
///
/// All nine buckets are always present in the serialized form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupedResult {
    pub movies: MovieGroups,
    pub books: BookGroups,
    pub games: GameGroups,
}

impl GroupedResult {
    /// Group entries, keeping their relative order within each bucket.
    pub fn from_entries(entries: impl IntoIterator<Item = ExtractedEntry>) -> Self {
        let mut grouped = Self::default();
        for entry in entries {
            grouped.bucket_mut(entry.status).push(entry);
        }
        grouped
    }

    /// Entries for a single status.
    pub fn bucket(&self, status: Status) -> &[ExtractedEntry] {
        match status {
            Status::Watching => &self.movies.watching,
            Status::Watched => &self.movies.watched,
            Status::WantToWatch => &self.movies.want_to_watch,
            Status::Reading => &self.books.reading,
            Status::Read => &self.books.read,
            Status::WantToRead => &self.books.want_to_read,
            Status::Playing => &self.games.playing,
            Status::Played => &self.games.played,
            Status::WantToPlay => &self.games.want_to_play,
        }
    }

    fn bucket_mut(&mut self, status: Status) -> &mut Vec<ExtractedEntry> {
        match status {
            Status::Watching => &mut self.movies.watching,
            Status::Watched => &mut self.movies.watched,
            Status::WantToWatch => &mut self.movies.want_to_watch,
            Status::Reading => &mut self.books.reading,
            Status::Read => &mut self.books.read,
            Status::WantToRead => &mut self.books.want_to_read,
            Status::Playing => &mut self.games.playing,
            Status::Played => &mut self.games.played,
            Status::WantToPlay => &mut self.games.want_to_play,
        }
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        Status::ALL.iter().map(|s| self.bucket(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A grouped result stamped with its fetch time, as written by `fetch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// ISO 8601 timestamp of the run
    pub updated_at: DateTime<Utc>,
    /// Total entry count
    pub count: usize,
    /// The grouped entries
    pub data: GroupedResult,
}

impl FeedSnapshot {
    pub fn new(data: GroupedResult) -> Self {
        Self {
            updated_at: Utc::now(),
            count: data.len(),
            data,
        }
    }
}
