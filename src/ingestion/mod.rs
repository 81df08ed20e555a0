//! Turns raw admin inputs (pasted CV text, URLs) into chunk records and
//! publishes them: chunk, embed, append to the persisted corpus, refresh
//! the in-memory cache.
//!
//! One URL failing to fetch or parse is logged and skipped; an embedding
//! service outage aborts the whole run. Nothing is persisted unless the
//! full successor corpus can be written, so storage never holds a partial
//! ingestion.

pub mod fetch;

pub use fetch::{HttpPageFetcher, PageFetcher, extract_visible_text};

use std::sync::Arc;

use tokio::sync::Mutex;
use url::Url;

use crate::cache::CorpusCache;
use crate::chunker::{chunk_text, truncate_graphemes};
use crate::embeddings::EmbeddingProvider;
use crate::stores::CorpusStore;
use crate::types::{ChunkRecord, Corpus, OriginKind, RagError};

/// Ingestion bounds. Page text is truncated before chunking to bound
/// embedding cost per source.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Maximum chunk length in grapheme clusters.
    pub chunk_size: usize,
    /// Maximum extracted page text length kept per URL.
    pub max_source_len: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            max_source_len: 8000,
        }
    }
}

/// Admin ingestion request: optional pasted CV text plus any number of
/// URLs to crawl.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    pub cv_text: Option<String>,
    pub urls: Vec<String>,
}

/// Outcome counters for one ingestion run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IngestReport {
    pub chunks_added: usize,
    pub sources_failed: usize,
    pub total_records: usize,
}

/// Read-chunk-embed-append-persist pipeline.
///
/// Runs are serialized behind an async mutex: two concurrent ingestions
/// would otherwise both read the same base corpus and the second write
/// would silently drop the first one's records.
pub struct IngestionPipeline {
    store: Arc<dyn CorpusStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<CorpusCache>,
    config: IngestConfig,
    write_guard: Mutex<()>,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<dyn CorpusStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        fetcher: Arc<dyn PageFetcher>,
        cache: Arc<CorpusCache>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            fetcher,
            cache,
            config,
            write_guard: Mutex::new(()),
        }
    }

    /// Runs one ingestion: reads the persisted corpus (not the cache),
    /// builds records for the CV text and each reachable URL, appends them,
    /// writes the whole successor corpus, then refreshes the cache.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReport, RagError> {
        let _guard = self.write_guard.lock().await;

        let mut corpus = self.store.read_all().await?;
        let mut new_records = Vec::new();
        let mut sources_failed = 0usize;

        if let Some(cv_text) = request.cv_text.as_deref().filter(|text| !text.is_empty()) {
            let records = self.embed_source(cv_text, OriginKind::Cv, None).await?;
            tracing::info!(chunks = records.len(), "cv text chunked and embedded");
            new_records.extend(records);
        }

        for raw_url in &request.urls {
            match self.ingest_url(raw_url).await {
                Ok(records) => {
                    tracing::info!(url = %raw_url, chunks = records.len(), "source ingested");
                    new_records.extend(records);
                }
                Err(err @ (RagError::SourceFetch { .. } | RagError::InvalidDocument(_))) => {
                    tracing::warn!(url = %raw_url, error = %err, "skipping source");
                    sources_failed += 1;
                }
                Err(err) => return Err(err),
            }
        }

        ensure_uniform_dimension(&corpus, &new_records)?;

        let chunks_added = new_records.len();
        corpus.append(new_records);
        self.store.write_all(&corpus).await?;

        let total_records = corpus.len();
        self.cache.set(corpus);

        tracing::info!(chunks_added, sources_failed, total_records, "ingestion complete");
        Ok(IngestReport {
            chunks_added,
            sources_failed,
            total_records,
        })
    }

    async fn ingest_url(&self, raw_url: &str) -> Result<Vec<ChunkRecord>, RagError> {
        let url = Url::parse(raw_url).map_err(|err| RagError::SourceFetch {
            url: raw_url.to_string(),
            message: err.to_string(),
        })?;

        let text = self.fetcher.fetch_text(&url).await?;
        let bounded = truncate_graphemes(&text, self.config.max_source_len);
        self.embed_source(bounded, OriginKind::Url, Some(url.to_string()))
            .await
    }

    async fn embed_source(
        &self,
        text: &str,
        origin: OriginKind,
        source: Option<String>,
    ) -> Result<Vec<ChunkRecord>, RagError> {
        let chunks = chunk_text(text, self.config.chunk_size);
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self.embedder.embed_batch(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "expected {} vectors, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        Ok(chunks
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(chunk_index, (content, embedding))| ChunkRecord {
                content,
                embedding,
                origin,
                source: source.clone(),
                chunk_index,
            })
            .collect())
    }
}

/// Rejects a batch whose embedding widths disagree with each other or with
/// the existing corpus. Mixed dimensionality would corrupt every later
/// similarity ranking.
fn ensure_uniform_dimension(corpus: &Corpus, new_records: &[ChunkRecord]) -> Result<(), RagError> {
    let mut expected = corpus.dimension();
    for record in new_records {
        match expected {
            None => expected = Some(record.embedding.len()),
            Some(dim) if record.embedding.len() != dim => {
                return Err(RagError::DimensionMismatch {
                    expected: dim,
                    actual: record.embedding.len(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}
