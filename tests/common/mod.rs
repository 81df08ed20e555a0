#![allow(dead_code)]

//! Shared fixtures for integration tests: canned page fetchers and failing
//! collaborators.

use std::collections::HashMap;

use async_trait::async_trait;
use url::Url;

use ragfolio::embeddings::EmbeddingProvider;
use ragfolio::ingestion::PageFetcher;
use ragfolio::types::RagError;

/// Serves canned page text keyed by URL; unknown URLs fail like an
/// unreachable site.
#[derive(Debug, Default)]
pub struct StaticPageFetcher {
    pages: HashMap<String, String>,
}

impl StaticPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.pages.insert(url.into(), text.into());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticPageFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String, RagError> {
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| RagError::SourceFetch {
                url: url.to_string(),
                message: "connection refused".into(),
            })
    }
}

/// Embedding collaborator that is always down.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_batch(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Err(RagError::Embedding("embedding service offline".into()))
    }
}
