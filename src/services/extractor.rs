// src/services/extractor.rs

//! Field extraction from entry body markup.
//!
//! Douban bodies are loosely structured HTML fragments: a poster `<img>`,
//! a "推荐: ..." line and optionally a free-text note. Extraction is best
//! effort; anything missing degrades to a default instead of failing.
//!
//! Two implementations share the [`Extractor`] trait:
//! - `PatternExtractor`: regex rules over the raw markup (default)
//! - `HtmlExtractor`: parses the fragment and walks its text nodes

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::models::{Classification, ExtractedEntry, ExtractionMode, FeedItem};
use crate::services::classifier::clean_title;

/// Rating used when the body carries no recommendation label.
pub const UNRATED: &str = "暂无评分";

/// Label that introduces the rating.
const RATING_LABEL: &str = "推荐: ";

static RATING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"推荐: ([^<\n]+)").unwrap());
static POSTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src=["']([^"']+)["'][^>]*>"#).unwrap());
static TAG_OR_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>|\n").unwrap());

/// Named extraction rules over an entry body.
///
/// Each rule returns `None` when its pattern does not apply; [`extract`]
/// turns that into the documented default.
///
/// [`extract`]: Extractor::extract
pub trait Extractor: Send + Sync {
    /// Recommendation label following "推荐: ".
    fn rating(&self, markup: &str) -> Option<String>;

    /// Source of the first image.
    fn poster(&self, markup: &str) -> Option<String>;

    /// Last piece of free text after the rating.
    fn comment(&self, markup: &str) -> Option<String>;

    /// Build the output entry for a classified feed item. Never fails.
    fn extract(&self, item: &FeedItem, classification: Classification) -> ExtractedEntry {
        let markup = item.content.as_deref().unwrap_or("");

        ExtractedEntry {
            title: clean_title(&item.title),
            link: item.link.clone(),
            rating: self.rating(markup).unwrap_or_else(|| UNRATED.to_string()),
            poster: self.poster(markup).unwrap_or_default(),
            pub_date: item.pub_date.clone(),
            status: classification.status(),
            category: classification.category(),
            comment: self.comment(markup).unwrap_or_default(),
        }
    }
}

/// Build the extractor selected by the configuration.
pub fn for_mode(mode: ExtractionMode) -> Box<dyn Extractor> {
    match mode {
        ExtractionMode::Pattern => Box::new(PatternExtractor),
        ExtractionMode::Html => Box::new(HtmlExtractor),
    }
}

/// Regex rules over the raw markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl Extractor for PatternExtractor {
    fn rating(&self, markup: &str) -> Option<String> {
        RATING
            .captures(markup)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    fn poster(&self, markup: &str) -> Option<String> {
        POSTER
            .captures(markup)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn comment(&self, markup: &str) -> Option<String> {
        let rating_end = RATING.find(markup)?.end();
        TAG_OR_NEWLINE
            .split(&markup[rating_end..])
            .map(str::trim)
            .filter(|run| !run.is_empty())
            .last()
            .map(str::to_string)
    }
}

/// HTML parse of the fragment; rules run over its text nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    /// Non-empty text lines in document order.
    fn lines(markup: &str) -> Vec<String> {
        let fragment = Html::parse_fragment(markup);
        fragment
            .root_element()
            .text()
            .flat_map(|text| text.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn rating_line(lines: &[String]) -> Option<(usize, String)> {
        lines.iter().enumerate().find_map(|(i, line)| {
            let start = line.find(RATING_LABEL)? + RATING_LABEL.len();
            let value = line[start..].trim();
            (!value.is_empty()).then(|| (i, value.to_string()))
        })
    }
}

impl Extractor for HtmlExtractor {
    fn rating(&self, markup: &str) -> Option<String> {
        Self::rating_line(&Self::lines(markup)).map(|(_, value)| value)
    }

    fn poster(&self, markup: &str) -> Option<String> {
        let selector = Selector::parse("img[src]").ok()?;
        let fragment = Html::parse_fragment(markup);
        fragment
            .select(&selector)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .find(|src| !src.is_empty())
            .map(str::to_string)
    }

    fn comment(&self, markup: &str) -> Option<String> {
        let lines = Self::lines(markup);
        let (index, _) = Self::rating_line(&lines)?;
        lines.get(index + 1..)?.last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Status};
    use crate::services::classifier::classify;

    const DOUBAN_BODY: &str = r#"<table><tr>
<td width="80px"><a href="https://movie.douban.com/subject/1/" title="电影标题"><img src="https://img9.doubanio.com/view/photo/s_ratio_poster/public/p1.jpg" alt="电影标题" /></a></td>
<td><p>推荐: 力荐</p><p>备注: 值得二刷</p></td></tr></table>"#;

    fn item(title: &str, content: Option<&str>) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: "https://movie.douban.com/subject/1/".to_string(),
            pub_date: "Sat, 06 Jan 2024 12:00:00 GMT".to_string(),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn test_pattern_rating() {
        let ex = PatternExtractor;
        assert_eq!(ex.rating("推荐: 力荐").as_deref(), Some("力荐"));
        assert_eq!(ex.rating("<p>推荐: 还行 </p>").as_deref(), Some("还行"));
        assert_eq!(ex.rating("推荐: 推荐\n下一行").as_deref(), Some("推荐"));
        assert_eq!(ex.rating("推荐:力荐"), None);
        assert_eq!(ex.rating(""), None);
    }

    #[test]
    fn test_pattern_poster() {
        let ex = PatternExtractor;
        assert_eq!(
            ex.poster(r#"<img src="http://x/y.jpg">"#).as_deref(),
            Some("http://x/y.jpg")
        );
        assert_eq!(
            ex.poster(r#"<img alt='a' src='http://x/a.png' /><img src="http://x/b.png">"#)
                .as_deref(),
            Some("http://x/a.png")
        );
        assert_eq!(ex.poster("<p>no image</p>"), None);
    }

    #[test]
    fn test_pattern_comment() {
        let ex = PatternExtractor;
        assert_eq!(ex.comment("推荐: 力荐\n很好看").as_deref(), Some("很好看"));
        assert_eq!(ex.comment(DOUBAN_BODY).as_deref(), Some("备注: 值得二刷"));
        assert_eq!(ex.comment("<p>推荐: 力荐</p>"), None);
        assert_eq!(ex.comment("no label\n很好看"), None);
    }

    #[test]
    fn test_extract_defaults_on_missing_markup() {
        let classification = classify("想读 A Book").unwrap();
        for content in [None, Some(""), Some("<<<garbage>")] {
            let entry = PatternExtractor.extract(&item("想读 A Book", content), classification);
            assert_eq!(entry.title, "A Book");
            assert_eq!(entry.rating, UNRATED);
            assert_eq!(entry.poster, "");
            assert_eq!(entry.comment, "");
            assert_eq!(entry.status, Status::WantToRead);
            assert_eq!(entry.category, Category::Book);
        }
    }

    #[test]
    fn test_extract_carries_link_and_date() {
        let feed_item = item("在看 电影标题", Some(DOUBAN_BODY));
        let entry = PatternExtractor.extract(&feed_item, classify(&feed_item.title).unwrap());

        assert_eq!(entry.title, "电影标题");
        assert_eq!(entry.rating, "力荐");
        assert_eq!(
            entry.poster,
            "https://img9.doubanio.com/view/photo/s_ratio_poster/public/p1.jpg"
        );
        assert_eq!(entry.link, feed_item.link);
        assert_eq!(entry.pub_date, feed_item.pub_date);
    }

    #[test]
    fn test_html_extractor_matches_pattern_on_douban_body() {
        let html = HtmlExtractor;
        assert_eq!(html.rating(DOUBAN_BODY).as_deref(), Some("力荐"));
        assert_eq!(
            html.poster(DOUBAN_BODY).as_deref(),
            Some("https://img9.doubanio.com/view/photo/s_ratio_poster/public/p1.jpg")
        );
        assert_eq!(html.comment(DOUBAN_BODY).as_deref(), Some("备注: 值得二刷"));
    }

    #[test]
    fn test_html_extractor_defaults() {
        let html = HtmlExtractor;
        assert_eq!(html.rating("<p>nothing</p>"), None);
        assert_eq!(html.poster("<img alt=\"no src\">"), None);
        assert_eq!(html.comment("<p>推荐: 力荐</p>"), None);
    }

    #[test]
    fn test_for_mode() {
        let body = r#"<img src="http://x/y.jpg"><p>推荐: 力荐</p>"#;
        for mode in [ExtractionMode::Pattern, ExtractionMode::Html] {
            let ex = for_mode(mode);
            assert_eq!(ex.rating(body).as_deref(), Some("力荐"));
            assert_eq!(ex.poster(body).as_deref(), Some("http://x/y.jpg"));
        }
    }
}
