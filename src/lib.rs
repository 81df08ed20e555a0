//! ```text
//! Admin input (CV text, URLs) ──► ingestion::IngestionPipeline
//!                                      │            │
//!                     external embedding call   stores::CorpusStore (JSON corpus)
//!                                                   │
//!                              warm load / refresh  ▼
//!                               cache::CorpusCache (snapshot cell)
//!                                                   │
//! Visitor query ──► chat::ChatService ──► retrieval::RetrievalEngine
//!                                                   │
//!                              bounded context ──► external completion call
//! ```
//!
//! Retrieval only ever reads the cache snapshot; persisted storage is
//! touched by the ingestion pipeline and by explicit cache loads.

pub mod cache;
pub mod chat;
pub mod chunker;
pub mod completions;
pub mod config;
pub mod embeddings;
pub mod ingestion;
pub mod retrieval;
pub mod server;
pub mod stores;
pub mod types;

pub use cache::CorpusCache;
pub use chat::ChatService;
pub use retrieval::{RetrievalConfig, RetrievalEngine};
pub use types::{ChunkRecord, Corpus, OriginKind, RagError};
