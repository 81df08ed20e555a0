//! Core data model and error taxonomy shared by the ingestion, caching, and
//! retrieval layers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provenance category of a stored chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    /// Pasted CV text supplied through the admin surface.
    Cv,
    /// Text extracted from a crawled web page.
    Url,
}

/// The atomic unit of the corpus: one bounded span of source text together
/// with its embedding vector and provenance.
///
/// Records are created only by the ingestion pipeline and never mutated
/// afterwards; they disappear only when a later whole-corpus rewrite omits
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub content: String,
    pub embedding: Vec<f32>,
    pub origin: OriginKind,
    /// Originating address for [`OriginKind::Url`] records, absent for CV text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Zero-based position within the chunk sequence of one source document.
    pub chunk_index: usize,
}

impl ChunkRecord {
    /// Builds a CV-origin record.
    pub fn cv(content: impl Into<String>, embedding: Vec<f32>, chunk_index: usize) -> Self {
        Self {
            content: content.into(),
            embedding,
            origin: OriginKind::Cv,
            source: None,
            chunk_index,
        }
    }

    /// Builds a URL-origin record carrying its source address.
    pub fn url(
        content: impl Into<String>,
        embedding: Vec<f32>,
        source: impl Into<String>,
        chunk_index: usize,
    ) -> Self {
        Self {
            content: content.into(),
            embedding,
            origin: OriginKind::Url,
            source: Some(source.into()),
            chunk_index,
        }
    }

    /// Grouping key for reading-order assembly: records from the same source
    /// document share a key.
    pub fn group_key(&self) -> (OriginKind, Option<&str>) {
        (self.origin, self.source.as_deref())
    }
}

/// Append-only ordered collection of chunk records.
///
/// Serialized transparently as a JSON array, which is also the persisted
/// layout of the corpus object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    records: Vec<ChunkRecord>,
}

impl Corpus {
    pub fn new(records: Vec<ChunkRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Embedding width of the corpus, taken from the first record.
    ///
    /// Uniform dimensionality across records is an ingestion invariant, so
    /// the first record is representative. `None` when the corpus is empty.
    pub fn dimension(&self) -> Option<usize> {
        self.records.first().map(|record| record.embedding.len())
    }

    /// Appends new records, preserving existing order.
    pub fn append(&mut self, records: Vec<ChunkRecord>) {
        self.records.extend(records);
    }
}

impl From<Vec<ChunkRecord>> for Corpus {
    fn from(records: Vec<ChunkRecord>) -> Self {
        Self::new(records)
    }
}

/// Errors surfaced by the ingestion, storage, and retrieval layers.
#[derive(Debug, Error)]
pub enum RagError {
    /// Backing corpus store could not be reached or its payload decoded.
    #[error("corpus storage unreachable: {0}")]
    StorageUnavailable(String),

    /// Backing corpus store rejected a whole-corpus write.
    #[error("corpus write rejected: {0}")]
    StorageWrite(String),

    /// The external embedding service failed.
    #[error("embedding service failure: {0}")]
    Embedding(String),

    /// The external completion service failed.
    #[error("completion service failure: {0}")]
    Completion(String),

    /// One source URL could not be fetched or parsed. Recovered locally by
    /// the ingestion pipeline, which skips the source.
    #[error("failed to fetch {url}: {message}")]
    SourceFetch { url: String, message: String },

    /// Query and stored vectors disagree on width. Fatal for retrieval:
    /// indicates corpus/model version skew, never silently mis-ranked.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization failure: {0}")]
    Serde(#[from] serde_json::Error),
}
