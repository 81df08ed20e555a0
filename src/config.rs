//! Environment-driven settings for the server binary.
//!
//! The library itself takes plain config structs; only the binary resolves
//! the environment. `.env` loading is the binary's concern (`dotenvy`).

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::types::RagError;

/// Resolved process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listen address, `RAGFOLIO_BIND` (default `127.0.0.1:3000`).
    pub bind_addr: SocketAddr,
    /// Corpus object path, `RAGFOLIO_CORPUS_PATH` (default `embeddings.json`).
    pub corpus_path: PathBuf,
    /// `OPENAI_API_KEY`, required.
    pub openai_api_key: String,
    /// `OPENAI_BASE_URL` override for OpenAI-compatible gateways.
    pub openai_base_url: Option<String>,
    /// `RAGFOLIO_EMBEDDING_MODEL` override.
    pub embedding_model: Option<String>,
    /// `RAGFOLIO_COMPLETION_MODEL` override.
    pub completion_model: Option<String>,
    /// `ADMIN_PASSWORD`, required; the admin surface is one equality check.
    pub admin_password: String,
    /// `RAGFOLIO_OWNER`, the name the assistant speaks for.
    pub owner_name: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, RagError> {
        let bind_addr = optional("RAGFOLIO_BIND")
            .unwrap_or_else(|| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| RagError::Config(format!("RAGFOLIO_BIND: {err}")))?;

        Ok(Self {
            bind_addr,
            corpus_path: optional("RAGFOLIO_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("embeddings.json")),
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL"),
            embedding_model: optional("RAGFOLIO_EMBEDDING_MODEL"),
            completion_model: optional("RAGFOLIO_COMPLETION_MODEL"),
            admin_password: required("ADMIN_PASSWORD")?,
            owner_name: optional("RAGFOLIO_OWNER").unwrap_or_else(|| "the site owner".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String, RagError> {
    env::var(key).map_err(|_| RagError::Config(format!("{key} is not set")))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}
