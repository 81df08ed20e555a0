use std::sync::Arc;

use reqwest::Client;
use tokio::net::TcpListener;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use ragfolio::cache::CorpusCache;
use ragfolio::chat::ChatService;
use ragfolio::completions::{CompletionProvider, OpenAiCompletionProvider};
use ragfolio::config::Settings;
use ragfolio::embeddings::{EmbeddingProvider, OpenAiEmbeddingProvider};
use ragfolio::ingestion::{HttpPageFetcher, IngestConfig, IngestionPipeline, PageFetcher};
use ragfolio::retrieval::{RetrievalConfig, RetrievalEngine};
use ragfolio::server::{self, AppState};
use ragfolio::stores::{CorpusStore, JsonFileStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let settings = Settings::from_env()?;

    let client = Client::builder()
        .user_agent(concat!("ragfolio/", env!("CARGO_PKG_VERSION")))
        .use_rustls_tls()
        .build()?;

    let store: Arc<dyn CorpusStore> = Arc::new(JsonFileStore::new(&settings.corpus_path));

    // Best-effort warm load: the server starts with whatever corpus exists,
    // or empty when storage is unreachable.
    let cache = Arc::new(CorpusCache::new());
    cache.warm(store.as_ref()).await;

    let mut embedder_impl =
        OpenAiEmbeddingProvider::new(client.clone(), settings.openai_api_key.clone());
    if let Some(base_url) = &settings.openai_base_url {
        embedder_impl = embedder_impl.with_base_url(base_url);
    }
    if let Some(model) = &settings.embedding_model {
        embedder_impl = embedder_impl.with_model(model);
    }
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder_impl);

    let mut completions_impl =
        OpenAiCompletionProvider::new(client.clone(), settings.openai_api_key.clone());
    if let Some(base_url) = &settings.openai_base_url {
        completions_impl = completions_impl.with_base_url(base_url);
    }
    if let Some(model) = &settings.completion_model {
        completions_impl = completions_impl.with_model(model);
    }
    let completions: Arc<dyn CompletionProvider> = Arc::new(completions_impl);

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(client));

    let pipeline = IngestionPipeline::new(
        store.clone(),
        embedder.clone(),
        fetcher,
        cache.clone(),
        IngestConfig::default(),
    );

    let chat = ChatService::new(
        store.clone(),
        cache.clone(),
        embedder,
        completions,
        RetrievalEngine::new(RetrievalConfig::default()),
        settings.owner_name.clone(),
    );

    let state = Arc::new(AppState {
        chat,
        pipeline,
        cache,
        store,
        admin_password: settings.admin_password.clone(),
    });

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(
        addr = %settings.bind_addr,
        corpus = %settings.corpus_path.display(),
        "ragfolio listening"
    );
    axum::serve(listener, server::router(state).into_make_service()).await?;

    Ok(())
}
