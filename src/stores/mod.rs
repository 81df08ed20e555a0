//! Persistence contract for the embedding corpus.
//!
//! The corpus is persisted as one JSON array at a well-known location and
//! replaced wholesale on every ingestion. No partial or delta writes exist:
//! every writer computes the full successor corpus and writes it whole.

pub mod json_file;

pub use json_file::JsonFileStore;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::types::{Corpus, RagError};

/// Whole-corpus persistence boundary consumed by the ingestion pipeline and
/// the corpus cache.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Reads the entire persisted corpus. A missing object is an empty
    /// corpus, not an error; an unreachable or undecodable backend is
    /// [`RagError::StorageUnavailable`].
    async fn read_all(&self) -> Result<Corpus, RagError>;

    /// Atomically replaces the entire persisted corpus. Overwriting an
    /// existing object must succeed; backend rejection is
    /// [`RagError::StorageWrite`].
    async fn write_all(&self, corpus: &Corpus) -> Result<(), RagError>;
}

/// In-process store used by tests and demos.
#[derive(Debug, Default)]
pub struct MemoryCorpusStore {
    inner: Mutex<Corpus>,
}

impl MemoryCorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an initial corpus.
    pub fn with_corpus(corpus: Corpus) -> Self {
        Self {
            inner: Mutex::new(corpus),
        }
    }
}

#[async_trait]
impl CorpusStore for MemoryCorpusStore {
    async fn read_all(&self) -> Result<Corpus, RagError> {
        Ok(self.inner.lock().clone())
    }

    async fn write_all(&self, corpus: &Corpus) -> Result<(), RagError> {
        *self.inner.lock() = corpus.clone();
        Ok(())
    }
}
