// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

use crate::error::Result;

/// Extension used when the URL path carries none.
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Extension (with the leading dot) of the last path segment of `url`.
///
/// A leading dot does not start an extension (`/.hidden` has none), and a
/// trailing dot is kept as-is (`/file.` yields `"."`). Falls back to
/// [`DEFAULT_EXTENSION`].
///
/// # Examples
/// ```
/// use douban_feed::utils::url::file_extension;
///
/// assert_eq!(file_extension("https://img.example.com/p/poster.webp?x=1").unwrap(), ".webp");
/// assert_eq!(file_extension("https://img.example.com/p/poster").unwrap(), ".jpg");
/// ```
pub fn file_extension(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    let basename = parsed.path().rsplit('/').next().unwrap_or("");

    let ext = match basename.rfind('.') {
        Some(idx) if idx > 0 => &basename[idx..],
        _ => "",
    };

    if ext.is_empty() {
        Ok(DEFAULT_EXTENSION.to_string())
    } else {
        Ok(ext.to_string())
    }
}

/// Resolve a redirect `Location` value against the URL that produced it.
pub fn resolve_location(current: &str, location: &str) -> Result<String> {
    let base = Url::parse(current)?;
    Ok(base.join(location)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_path() {
        assert_eq!(
            file_extension("https://img9.doubanio.com/view/photo/s_ratio_poster/public/p2.jpg")
                .unwrap(),
            ".jpg"
        );
        assert_eq!(file_extension("http://x/y.png").unwrap(), ".png");
        assert_eq!(file_extension("http://x/a.b/c.tar.gz").unwrap(), ".gz");
    }

    #[test]
    fn test_extension_ignores_query_and_fragment() {
        assert_eq!(file_extension("http://x/y.webp?w=200#top").unwrap(), ".webp");
        assert_eq!(file_extension("http://x/y?format=.png").unwrap(), ".jpg");
    }

    #[test]
    fn test_extension_defaults() {
        assert_eq!(file_extension("http://x/").unwrap(), ".jpg");
        assert_eq!(file_extension("http://x/poster").unwrap(), ".jpg");
        assert_eq!(file_extension("http://x/.hidden").unwrap(), ".jpg");
        assert_eq!(file_extension("http://x/dir.d/poster").unwrap(), ".jpg");
    }

    #[test]
    fn test_extension_trailing_dot() {
        assert_eq!(file_extension("http://x/poster.").unwrap(), ".");
    }

    #[test]
    fn test_extension_invalid_url() {
        assert!(file_extension("not a url").is_err());
    }

    #[test]
    fn test_resolve_location() {
        assert_eq!(
            resolve_location("http://a.com/img/1.jpg", "https://cdn.com/1.jpg").unwrap(),
            "https://cdn.com/1.jpg"
        );
        assert_eq!(
            resolve_location("http://a.com/img/1.jpg", "/other/2.jpg").unwrap(),
            "http://a.com/other/2.jpg"
        );
        assert_eq!(
            resolve_location("http://a.com/img/1.jpg", "3.jpg").unwrap(),
            "http://a.com/img/3.jpg"
        );
    }
}
