//! Feed entry data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw item from the remote activity feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    /// Item title, e.g. "想看 看不见的客人"
    pub title: String,

    /// Link to the subject page
    pub link: String,

    /// Publication timestamp as published by the feed
    pub pub_date: String,

    /// Body markup (`<description>` or `<content:encoded>`)
    pub content: Option<String>,
}

impl From<&rss::Item> for FeedItem {
    fn from(item: &rss::Item) -> Self {
        Self {
            title: item.title().unwrap_or_default().to_string(),
            link: item.link().unwrap_or_default().to_string(),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
            content: item
                .description()
                .or_else(|| item.content())
                .map(str::to_string),
        }
    }
}

/// Subject category of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movie,
    Book,
    Game,
}

impl Category {
    /// Statuses of this category in marker precedence order.
    pub fn statuses(self) -> [Status; 3] {
        match self {
            Category::Movie => [Status::Watching, Status::Watched, Status::WantToWatch],
            Category::Book => [Status::Reading, Status::Read, Status::WantToRead],
            Category::Game => [Status::Playing, Status::Played, Status::WantToPlay],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Movie => "movie",
            Category::Book => "book",
            Category::Game => "game",
        };
        f.write_str(name)
    }
}

/// Lifecycle status of an entry. Serialized as its marker token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "在看")]
    Watching,
    #[serde(rename = "看过")]
    Watched,
    #[serde(rename = "想看")]
    WantToWatch,
    #[serde(rename = "在读")]
    Reading,
    #[serde(rename = "读过")]
    Read,
    #[serde(rename = "想读")]
    WantToRead,
    #[serde(rename = "在玩")]
    Playing,
    #[serde(rename = "玩过")]
    Played,
    #[serde(rename = "想玩")]
    WantToPlay,
}

impl Status {
    /// All statuses, grouped by category.
    pub const ALL: [Status; 9] = [
        Status::Watching,
        Status::Watched,
        Status::WantToWatch,
        Status::Reading,
        Status::Read,
        Status::WantToRead,
        Status::Playing,
        Status::Played,
        Status::WantToPlay,
    ];

    /// Marker token that identifies this status in a feed title.
    pub fn marker(self) -> &'static str {
        match self {
            Status::Watching => "在看",
            Status::Watched => "看过",
            Status::WantToWatch => "想看",
            Status::Reading => "在读",
            Status::Read => "读过",
            Status::WantToRead => "想读",
            Status::Playing => "在玩",
            Status::Played => "玩过",
            Status::WantToPlay => "想玩",
        }
    }

    /// Category this status belongs to.
    pub fn category(self) -> Category {
        match self {
            Status::Watching | Status::Watched | Status::WantToWatch => Category::Movie,
            Status::Reading | Status::Read | Status::WantToRead => Category::Book,
            Status::Playing | Status::Played | Status::WantToPlay => Category::Game,
        }
    }

    /// Key used for this status in grouped output.
    pub fn key(self) -> &'static str {
        match self {
            Status::Watching => "watching",
            Status::Watched => "watched",
            Status::WantToWatch => "wantToWatch",
            Status::Reading => "reading",
            Status::Read => "read",
            Status::WantToRead => "wantToRead",
            Status::Playing => "playing",
            Status::Played => "played",
            Status::WantToPlay => "wantToPlay",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A (category, status) pair. The category is derived from the status, so
/// the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    status: Status,
}

impl Classification {
    pub fn new(status: Status) -> Self {
        Self { status }
    }

    pub fn category(self) -> Category {
        self.status.category()
    }

    pub fn status(self) -> Status {
        self.status
    }
}

/// A classified entry with fields pulled from its body markup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedEntry {
    /// Title with the leading status marker removed
    pub title: String,

    /// Link to the subject page
    pub link: String,

    /// Recommendation label, or the unrated sentinel
    pub rating: String,

    /// Poster reference: remote URL, cached public path, or empty
    pub poster: String,

    /// Publication timestamp, unchanged from the feed
    pub pub_date: String,

    /// Lifecycle status
    pub status: Status,

    /// Subject category
    #[serde(rename = "type")]
    pub category: Category,

    /// Free-text comment, possibly empty
    pub comment: String,
}
