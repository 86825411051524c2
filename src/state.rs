use std::sync::Arc;

use tokio::sync::RwLock;

use crate::aggregate::Snapshot;

/// The current snapshot, shared between the refresh task (single writer)
/// and request handlers / the CLI path (many readers).
///
/// Lifecycle: initialized empty at startup, replaced atomically by each
/// refresh pass, read through [`current`](SharedSnapshot::current). Readers
/// only ever see the fully-old or fully-new snapshot, and never hold the
/// lock longer than an `Arc` clone.
#[derive(Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current(&self) -> Arc<Snapshot> {
        self.inner.read().await.clone()
    }

    /// Publish the result of a refresh pass.
    ///
    /// When every feed failed (`total_failure`), the previous items and
    /// `updated_at` are retained so a signage screen never goes blank over
    /// a transient outage; only the error list is replaced. A pass with at
    /// least one successful feed always publishes in full.
    pub async fn publish(&self, mut snapshot: Snapshot, total_failure: bool) {
        let mut guard = self.inner.write().await;
        if total_failure && !guard.items.is_empty() {
            snapshot.items = guard.items.clone();
            snapshot.updated_at = guard.updated_at;
        }
        *guard = Arc::new(snapshot);
    }
}
