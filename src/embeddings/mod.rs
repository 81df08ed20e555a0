//! External embedding collaborator.
//!
//! The corpus stores whatever vectors the configured provider produces;
//! dimensionality is the provider's to choose and must stay constant for
//! the lifetime of a corpus.

pub mod openai;

pub use openai::OpenAiEmbeddingProvider;

use async_trait::async_trait;

use crate::types::RagError;

/// Produces fixed-dimension embedding vectors for text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of inputs, returning one vector per input in order.
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embeds a single input.
    async fn embed(&self, input: &str) -> Result<Vec<f32>, RagError> {
        let batch = [input.to_string()];
        let vectors = self.embed_batch(&batch).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("provider returned no vectors".into()))
    }
}

/// Deterministic hash-based provider for tests and offline runs. Identical
/// inputs always produce identical vectors.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dims: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dims: 8 }
    }

    pub fn with_dims(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(inputs
            .iter()
            .map(|input| hash_to_vec(input, self.dims))
            .collect())
    }
}

fn hash_to_vec(text: &str, dims: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..dims)
        .map(|i| {
            let bits = seed.rotate_left((i * 8) as u32) ^ ((i as u64) << 24);
            (bits as f64 / u32::MAX as f64) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let provider = MockEmbeddingProvider::new();
        let inputs = vec![
            "hello world".to_string(),
            "goodbye world".to_string(),
            "hello world".to_string(),
        ];

        let first = provider.embed_batch(&inputs).await.unwrap();
        let second = provider.embed_batch(&inputs).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], first[2]);
        assert_ne!(first[0], first[1]);
    }

    #[tokio::test]
    async fn mock_embeddings_have_fixed_width() {
        let provider = MockEmbeddingProvider::with_dims(16);
        let vector = provider.embed("anything").await.unwrap();
        assert_eq!(vector.len(), 16);
    }
}
