use std::fmt::Write;

use chrono::SecondsFormat;

use crate::feed::FeedItem;

/// Human-readable listing for fetch mode, one block per item.
pub fn render_plain(items: &[FeedItem]) -> String {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "- [{}] {}", item.source, item.title);
        let _ = writeln!(out, "  {}", item.link);
        let published = item
            .published
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "unknown-time".to_string());
        let _ = writeln!(out, "  {published}");
        if let Some(author) = &item.author {
            let _ = writeln!(out, "  by: {author}");
        }
        if let Some(summary) = &item.summary {
            let _ = writeln!(out, "  summary: {summary}");
        }
    }
    out
}

/// Machine-readable listing for `--json`.
pub fn render_json(items: &[FeedItem]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(items)
}
