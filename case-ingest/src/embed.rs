//! Embedding abstraction over the HTTP embeddings service.
//!
//! The same provider instance is used at upload time and at probe time, so
//! write-side and query-side vectors always come from the same model.

use async_trait::async_trait;
use llm_service::{EmbeddingClient, LlmConfig};
use tracing::debug;

use crate::errors::IngestError;

/// Provider interface for embedding generation.
///
/// Implement this trait to plug in another embedding backend; the pipeline
/// only ever sees text in, vectors out.
#[async_trait]
pub trait EmbeddingsProvider: Send + Sync {
    /// Produces an embedding vector for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IngestError>;

    /// Produces embedding vectors for a batch of texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError>;
}

/// Embeddings via an OpenAI-compatible `/v1/embeddings` endpoint, with
/// every returned vector checked against the collection's dimensionality.
pub struct LlmEmbedder {
    client: EmbeddingClient,
    want_dim: usize,
}

impl LlmEmbedder {
    /// # Errors
    /// Returns `IngestError::Embedding` if the HTTP client cannot be built.
    pub fn new(cfg: LlmConfig, want_dim: usize) -> Result<Self, IngestError> {
        let client = EmbeddingClient::new(cfg)
            .map_err(|e| IngestError::Embedding(format!("client build: {e}")))?;
        Ok(Self { client, want_dim })
    }

    fn check_dim(&self, vector: &[f32]) -> Result<(), IngestError> {
        if vector.len() != self.want_dim {
            return Err(IngestError::VectorSizeMismatch {
                got: vector.len(),
                want: self.want_dim,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingsProvider for LlmEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IngestError> {
        let vector = self
            .client
            .embed(text)
            .await
            .map_err(|e| IngestError::Embedding(e.to_string()))?;
        self.check_dim(&vector)?;
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IngestError> {
        let vectors = self
            .client
            .embed_many(texts)
            .await
            .map_err(|e| IngestError::Embedding(e.to_string()))?;
        for v in &vectors {
            self.check_dim(v)?;
        }
        debug!(texts = texts.len(), "batch embedded");
        Ok(vectors)
    }
}
