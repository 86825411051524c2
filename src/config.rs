use std::collections::HashSet;
use std::path::Path;

use tracing::info;

/// Feeds used when neither CLI arguments nor a feeds file supply any.
pub const DEFAULT_FEEDS: &[&str] = &[
    "https://feeds.bbci.co.uk/news/rss.xml",
    "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml",
    "https://www.npr.org/rss/rss.php?id=1001",
    "https://rss.cnn.com/rss/edition.rss",
    "https://www.aljazeera.com/xml/rss/all.xml",
    "https://feeds.skynews.com/feeds/rss/home.xml",
    "https://www.theguardian.com/world/rss",
    "https://www.engadget.com/rss.xml",
    "https://feeds.arstechnica.com/arstechnica/index",
    "https://moxie.foxnews.com/google-publisher/latest.xml",
    "https://www.cnbc.com/id/100003114/device/rss/rss.html",
    "https://www.wired.com/feed/rss",
];

/// Startup configuration problems. Always fatal: the process prints the
/// diagnostic and exits before any fetching occurs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid feed URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{name} must be a positive value")]
    NonPositive { name: &'static str },
}

pub fn ensure_positive<T>(name: &'static str, value: T) -> Result<T, ConfigError>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        return Err(ConfigError::NonPositive { name });
    }
    Ok(value)
}

pub fn validate_urls(urls: &[String]) -> Result<(), ConfigError> {
    for url in urls {
        let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                url: url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
    }
    Ok(())
}

/// Read a feeds file: one URL per line; blank lines and `#` comments are
/// skipped, duplicate lines collapse. A missing file yields an empty list
/// so resolution can fall through to the built-in feeds.
pub fn load_feeds_file(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

/// Resolve the feed list for signage mode.
///
/// Order: explicit CLI URLs, then the feeds file, then [`DEFAULT_FEEDS`].
/// URLs from the CLI or a file are validated; a malformed entry is a fatal
/// [`ConfigError`].
pub fn resolve_feeds(cli_urls: &[String], feeds_file: &Path) -> Result<Vec<String>, ConfigError> {
    if !cli_urls.is_empty() {
        validate_urls(cli_urls)?;
        info!(count = cli_urls.len(), "using feed URLs from CLI arguments");
        return Ok(cli_urls.to_vec());
    }

    let from_file = load_feeds_file(feeds_file);
    if !from_file.is_empty() {
        validate_urls(&from_file)?;
        info!(
            count = from_file.len(),
            path = %feeds_file.display(),
            "loaded feeds from file"
        );
        return Ok(from_file);
    }

    info!("no feed URLs supplied and feeds file missing or empty, using built-in feeds");
    Ok(DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_ensure_positive_accepts_nonzero() {
        assert_eq!(ensure_positive("limit", 10usize).unwrap(), 10);
        assert_eq!(ensure_positive("timeout", 1u64).unwrap(), 1);
    }

    #[test]
    fn test_ensure_positive_rejects_zero() {
        let err = ensure_positive("limit", 0usize).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_validate_urls_accepts_http_and_https() {
        let urls = vec![
            "http://example.com/rss".to_string(),
            "https://example.com/atom.xml".to_string(),
        ];
        assert!(validate_urls(&urls).is_ok());
    }

    #[test]
    fn test_validate_urls_rejects_malformed() {
        let urls = vec!["not a url".to_string()];
        let err = validate_urls(&urls).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_validate_urls_rejects_other_schemes() {
        let urls = vec!["ftp://example.com/feed".to_string()];
        let err = validate_urls(&urls).unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_load_feeds_file_skips_comments_and_blanks() {
        let content = "\
# primary sources
https://example.com/rss

https://example.org/atom.xml
  # indented comment
https://example.com/rss
";
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let feeds = load_feeds_file(temp_file.path());
        assert_eq!(
            feeds,
            vec![
                "https://example.com/rss".to_string(),
                "https://example.org/atom.xml".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_feeds_file_missing_returns_empty() {
        let feeds = load_feeds_file(Path::new("/nonexistent/feeds.txt"));
        assert!(feeds.is_empty());
    }

    #[test]
    fn test_resolve_prefers_cli_urls() {
        let content = "https://file.example.com/rss\n";
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let cli = vec!["https://cli.example.com/rss".to_string()];
        let feeds = resolve_feeds(&cli, temp_file.path()).unwrap();
        assert_eq!(feeds, cli);
    }

    #[test]
    fn test_resolve_falls_back_to_feeds_file() {
        let content = "https://file.example.com/rss\n";
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();

        let feeds = resolve_feeds(&[], temp_file.path()).unwrap();
        assert_eq!(feeds, vec!["https://file.example.com/rss".to_string()]);
    }

    #[test]
    fn test_resolve_falls_back_to_builtins() {
        let feeds = resolve_feeds(&[], Path::new("/nonexistent/feeds.txt")).unwrap();
        assert_eq!(feeds.len(), DEFAULT_FEEDS.len());
        assert_eq!(feeds[0], DEFAULT_FEEDS[0]);
    }

    #[test]
    fn test_resolve_rejects_bad_cli_url() {
        let cli = vec!["nope".to_string()];
        let result = resolve_feeds(&cli, Path::new("/nonexistent/feeds.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_feeds_are_valid() {
        let urls: Vec<String> = DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect();
        assert!(validate_urls(&urls).is_ok());
    }
}
