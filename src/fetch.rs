use std::time::Duration;

use reqwest::Client;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::aggregate::FetchOutcome;
use crate::feed::{parse_feed, FeedError, FeedItem};

const USER_AGENT: &str = "newswall/0.1 (RSS aggregator)";

/// HTTP client for feed downloads. Cheap to clone; the timeout and TLS
/// settings are fixed at construction for the process lifetime.
#[derive(Clone)]
pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(timeout: Duration, insecure: bool) -> anyhow::Result<Self> {
        if insecure {
            warn!("TLS certificate verification is disabled");
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(insecure)
            .build()?;

        Ok(Self { client })
    }

    /// Download and parse one feed. Network failures, timeouts, non-2xx
    /// statuses, and malformed documents all surface as a [`FeedError`]
    /// for this feed alone.
    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<FeedItem>, FeedError> {
        debug!(%url, "fetching feed");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        parse_feed(&bytes, url)
    }

    /// Fetch every feed concurrently, one task per feed, so a refresh pass
    /// costs roughly the slowest feed rather than the sum of all of them.
    /// Results come back in the input URL order, which keeps de-duplication
    /// deterministic (the first-listed feed wins ties).
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<FetchOutcome> {
        let mut tasks = JoinSet::new();
        for (index, url) in urls.iter().cloned().enumerate() {
            let client = self.clone();
            tasks.spawn(async move {
                let result = client.fetch_feed(&url).await;
                (index, url, result)
            });
        }

        let mut slots: Vec<Option<FetchOutcome>> = (0..urls.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, url, result)) => slots[index] = Some((url, result)),
                Err(e) => warn!("feed fetch task failed: {e}"),
            }
        }

        slots.into_iter().flatten().collect()
    }
}
