use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::{FeedError, FeedItem};

/// The result of fetching one feed: its URL plus items or a contained error.
pub type FetchOutcome = (String, Result<Vec<FeedItem>, FeedError>);

/// The complete, immutable result of one aggregation pass. Served to all
/// readers until the next pass replaces it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<FeedItem>,
    pub errors: Vec<String>,
}

impl Snapshot {
    /// The initial state before any refresh has completed.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Merge per-feed results into one snapshot.
///
/// Pipeline: concatenate successful feeds in input order, collapse duplicate
/// links (first occurrence wins), apply the optional case-insensitive keyword
/// filter, sort by publish time descending (undated items last, stable), and
/// truncate to `limit`. Failed feeds become entries in `errors`; aggregation
/// itself never fails.
pub fn aggregate(outcomes: Vec<FetchOutcome>, keyword: Option<&str>, limit: usize) -> Snapshot {
    let mut items = Vec::new();
    let mut errors = Vec::new();

    for (url, outcome) in outcomes {
        match outcome {
            Ok(feed_items) => items.extend(feed_items),
            Err(e) => errors.push(format!("failed to read {url}: {e}")),
        }
    }

    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.link.trim().to_string()));

    if let Some(keyword) = keyword {
        let needle = keyword.to_lowercase();
        items.retain(|item| matches_keyword(item, &needle));
    }

    // Stable sort; None sorts below Some, so descending order puts undated
    // items last while keeping their relative order.
    items.sort_by(|a, b| b.published.cmp(&a.published));
    items.truncate(limit);

    Snapshot {
        updated_at: Some(Utc::now()),
        items,
        errors,
    }
}

fn matches_keyword(item: &FeedItem, needle: &str) -> bool {
    [
        Some(item.title.as_str()),
        Some(item.source.as_str()),
        item.summary.as_deref(),
        item.author.as_deref(),
    ]
    .iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}
