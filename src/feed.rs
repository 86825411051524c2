use chrono::{DateTime, Utc};
use feed_rs::parser;
use serde::Serialize;
use tracing::debug;

/// One normalized headline from a feed. Immutable once constructed;
/// a new refresh pass replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub source: String,
    pub title: String,
    pub link: String,
    #[serde(rename = "published_at")]
    pub published: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Per-feed failure. Contained to the feed it came from: the aggregator
/// records these as warnings instead of propagating them.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("parse failed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

/// Parse a fetched document into feed items.
///
/// feed-rs sniffs the format from the root element (RSS 0.x/1.0/2.0, Atom,
/// JSON Feed) and normalizes entries into a common model; this maps that
/// model onto [`FeedItem`]. Entries without a title or link are dropped.
pub fn parse_feed(raw: &[u8], url: &str) -> Result<Vec<FeedItem>, FeedError> {
    let parsed = parser::parse(raw)?;

    let source = parsed
        .title
        .as_ref()
        .map(|t| collapse_whitespace(&t.content))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| host_of(url));
    debug!(format = ?parsed.feed_type, source = %source, entries = parsed.entries.len(), "parsed feed");

    let mut items = Vec::with_capacity(parsed.entries.len());
    for entry in parsed.entries {
        let title = entry
            .title
            .as_ref()
            .map(|t| collapse_whitespace(&t.content))
            .unwrap_or_default();
        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            debug!(source = %source, "skipping entry without title or link");
            continue;
        }

        let published = entry.published.or(entry.updated);
        let summary = entry
            .summary
            .as_ref()
            .map(|t| strip_html(&t.content))
            .filter(|s| !s.is_empty())
            .or_else(|| {
                entry
                    .content
                    .as_ref()
                    .and_then(|c| c.body.as_deref())
                    .map(strip_html)
                    .filter(|s| !s.is_empty())
            });
        let author = entry
            .authors
            .first()
            .map(|a| collapse_whitespace(&a.name))
            .filter(|s| !s.is_empty());

        items.push(FeedItem {
            source: source.clone(),
            title,
            link,
            published,
            summary,
            author,
        });
    }

    Ok(items)
}

fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop markup tags from summary/content bodies, then collapse whitespace.
fn strip_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            ch if !in_tag => out.push(ch),
            _ => {}
        }
    }
    collapse_whitespace(&out)
}
