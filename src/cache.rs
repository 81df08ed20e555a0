//! Process-wide in-memory materialization of the persisted corpus.
//!
//! The cache is a single snapshot cell: readers take the current `Arc`
//! without blocking, writers replace the whole snapshot in one pointer
//! swap. A reader racing a refresh sees either the old or the new corpus,
//! never a partial one. There is no TTL and no revalidation: the corpus
//! changes only through the ingestion path, which refreshes the cache in
//! the same operation that rewrites storage.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::stores::CorpusStore;
use crate::types::Corpus;

/// Snapshot cell holding the current corpus.
///
/// Starts empty rather than "not yet loaded": downstream consumers never
/// have to distinguish the two.
#[derive(Debug, Default)]
pub struct CorpusCache {
    snapshot: RwLock<Arc<Corpus>>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot. Never blocks on I/O, never re-fetches.
    pub fn get(&self) -> Arc<Corpus> {
        self.snapshot.read().clone()
    }

    /// Replaces the snapshot wholesale. Called by the ingestion pipeline
    /// after a successful persisted write.
    pub fn set(&self, corpus: Corpus) {
        *self.snapshot.write() = Arc::new(corpus);
    }

    /// Best-effort load from the store. On success the snapshot is
    /// replaced; on failure it is left as-is and the error is logged, so a
    /// failed warm-up degrades to an empty cache instead of crashing the
    /// process.
    pub async fn warm(&self, store: &dyn CorpusStore) {
        match store.read_all().await {
            Ok(corpus) => {
                tracing::info!(records = corpus.len(), "corpus cache loaded");
                self.set(corpus);
            }
            Err(err) => {
                tracing::warn!(error = %err, "corpus load failed, cache unchanged");
            }
        }
    }

    /// Returns the snapshot, attempting one best-effort reload first when
    /// it is empty. Used by the retrieval path so a process that started
    /// before any ingestion can still pick up a corpus written since.
    pub async fn get_or_reload(&self, store: &dyn CorpusStore) -> Arc<Corpus> {
        {
            let snapshot = self.get();
            if !snapshot.is_empty() {
                return snapshot;
            }
        }
        self.warm(store).await;
        self.get()
    }
}
