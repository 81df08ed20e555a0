//! Filesystem-backed corpus store: one JSON object at a well-known path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::CorpusStore;
use crate::types::{Corpus, RagError};

/// Persists the corpus as a single pretty-printed JSON array, overwritten
/// wholesale on each write. Replacement goes through a sibling temp file
/// and a rename, so readers never observe a half-written corpus.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl CorpusStore for JsonFileStore {
    async fn read_all(&self) -> Result<Corpus, RagError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Corpus::default()),
            Err(err) => {
                return Err(RagError::StorageUnavailable(format!(
                    "{}: {err}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&raw).map_err(|err| {
            RagError::StorageUnavailable(format!("decoding {}: {err}", self.path.display()))
        })
    }

    async fn write_all(&self, corpus: &Corpus) -> Result<(), RagError> {
        let payload = serde_json::to_vec_pretty(corpus)
            .map_err(|err| RagError::StorageWrite(err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| RagError::StorageWrite(err.to_string()))?;
            }
        }

        let temp = self.temp_path();
        fs::write(&temp, &payload)
            .await
            .map_err(|err| RagError::StorageWrite(err.to_string()))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|err| RagError::StorageWrite(err.to_string()))?;

        Ok(())
    }
}
