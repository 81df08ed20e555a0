//! Chat orchestration: embed the query, retrieve context from the cache
//! snapshot, and hand the assembled prompt to the completion collaborator.
//!
//! Two outcomes are deliberately not errors: an empty corpus and a query
//! with no relevant context both map to fixed messages, so the generative
//! call is never invoked with an empty context.

use std::sync::Arc;

use crate::cache::CorpusCache;
use crate::completions::CompletionProvider;
use crate::embeddings::EmbeddingProvider;
use crate::retrieval::RetrievalEngine;
use crate::stores::CorpusStore;
use crate::types::RagError;

/// Reply when no corpus has been ingested yet.
pub const NO_DATA_MESSAGE: &str =
    "**No portfolio data available.** Please ask about my portfolio later.";

/// Reply when nothing in the corpus was relevant enough to the query.
pub const NO_CONTEXT_MESSAGE: &str = "**I'm here to help with portfolio-related questions!** \
     Please ask about my experience, projects, or skills.";

/// Generic failure reply; raw error detail never reaches the visitor.
pub const TRY_AGAIN_MESSAGE: &str =
    "**Error:** Failed to process your request. Please try again later.";

/// Answers visitor questions against the cached corpus.
pub struct ChatService {
    store: Arc<dyn CorpusStore>,
    cache: Arc<CorpusCache>,
    embedder: Arc<dyn EmbeddingProvider>,
    completions: Arc<dyn CompletionProvider>,
    engine: RetrievalEngine,
    owner_name: String,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn CorpusStore>,
        cache: Arc<CorpusCache>,
        embedder: Arc<dyn EmbeddingProvider>,
        completions: Arc<dyn CompletionProvider>,
        engine: RetrievalEngine,
        owner_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            embedder,
            completions,
            engine,
            owner_name: owner_name.into(),
        }
    }

    /// Produces the assistant reply for one visitor query. `Ok` covers the
    /// fixed no-data and no-context messages as well as a generated answer;
    /// `Err` means an external collaborator failed.
    pub async fn answer(&self, query: &str) -> Result<String, RagError> {
        let corpus = self.cache.get_or_reload(self.store.as_ref()).await;
        if corpus.is_empty() {
            tracing::info!("chat requested before any ingestion");
            return Ok(NO_DATA_MESSAGE.to_string());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let context = self.engine.retrieve(query, &query_embedding, &corpus)?;

        if context.is_empty() {
            tracing::info!("no chunk met the relevance threshold");
            return Ok(NO_CONTEXT_MESSAGE.to_string());
        }

        let system_prompt = self.system_prompt(&context);
        self.completions.complete(&system_prompt, query).await
    }

    fn system_prompt(&self, context: &str) -> String {
        let owner = &self.owner_name;
        format!(
            "You are {owner}'s portfolio assistant, designed to showcase {owner}'s professional \
             expertise and achievements. Answer only questions directly related to the provided \
             portfolio context, which contains public information such as {owner}'s CV, project \
             details, and professional bio. Share only this public portfolio-related information \
             and avoid any sensitive or unrelated personal details. Do not provide general \
             knowledge or answers outside the context, even if the query seems tangentially \
             related; if the query is irrelevant or the context is insufficient, politely refuse \
             with a brief markdown-formatted message. Format all responses in markdown for \
             clarity, using headings (##) for main topics, lists (-) for multiple points, bold \
             (**) for emphasis, and links ([text](url)) for URLs mentioned in the context. Keep \
             responses concise and prioritize key details. If the query is ambiguous, ask for \
             clarification within the portfolio context. Context ({owner}'s portfolio):\n{context}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completions::MockCompletionProvider;
    use crate::embeddings::MockEmbeddingProvider;
    use crate::stores::MemoryCorpusStore;

    fn service_with_empty_store() -> ChatService {
        ChatService::new(
            Arc::new(MemoryCorpusStore::new()),
            Arc::new(CorpusCache::new()),
            Arc::new(MockEmbeddingProvider::new()),
            Arc::new(MockCompletionProvider::new("generated answer")),
            RetrievalEngine::default(),
            "Jordan",
        )
    }

    #[tokio::test]
    async fn empty_corpus_returns_the_no_data_message() {
        let reply = service_with_empty_store().answer("what have you built?").await.unwrap();
        assert_eq!(reply, NO_DATA_MESSAGE);
    }

    #[test]
    fn system_prompt_carries_owner_and_context() {
        let service = service_with_empty_store();
        let prompt = service.system_prompt("relevant chunk text");
        assert!(prompt.contains("Jordan's portfolio assistant"));
        assert!(prompt.ends_with("relevant chunk text"));
    }
}
