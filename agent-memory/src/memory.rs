//! Store/find operations over the persistent memory collection.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use case_ingest::{EmbeddingsProvider, PointKey, StoredPoint, VectorIndex, VectorSpec};

use crate::errors::MemoryError;

/// Deterministic UUIDv5 for a remembered fact: storing the same text twice
/// overwrites one point instead of accumulating duplicates.
fn stable_uuid(text: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, text.as_bytes())
}

/// Facts stored as vectors plus payload in a collection that outlives any
/// single conversation.
pub struct MemoryStore {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingsProvider>,
    spec: VectorSpec,
}

impl MemoryStore {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingsProvider>,
        spec: VectorSpec,
    ) -> Self {
        Self {
            index,
            embedder,
            spec,
        }
    }

    /// Create the memory collection if it does not exist yet. Unlike the
    /// ingestion collection, an existing one is left untouched.
    pub async fn ensure_ready(&self) -> Result<(), MemoryError> {
        if !self.index.exists().await? {
            self.index.create(&self.spec).await?;
            info!(vector_name = %self.spec.vector_name, "memory collection created");
        }
        Ok(())
    }

    /// Persist one fact.
    pub async fn store(&self, information: &str) -> Result<(), MemoryError> {
        let vector = self.embedder.embed(information).await?;
        let point = StoredPoint {
            id: PointKey::Uuid(stable_uuid(information).to_string()),
            vector,
            payload: json!({
                "document": information,
                "stored_at": Utc::now().to_rfc3339(),
            }),
        };
        self.index.upsert(vec![point]).await?;
        debug!(chars = information.len(), "fact stored");
        Ok(())
    }

    /// Return the documents of the `limit` facts most similar to `query`.
    pub async fn find(&self, query: &str, limit: u64) -> Result<Vec<String>, MemoryError> {
        let vector = self.embedder.embed(query).await?;
        let hits = self.index.search(vector, limit).await?;
        debug!(hits = hits.len(), "memory searched");
        Ok(hits.into_iter().filter_map(|h| h.document).collect())
    }
}
