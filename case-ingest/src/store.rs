//! Vector-store seam: the minimal collection API the pipeline consumes.
//!
//! The trait keeps the stages decoupled from the concrete client; the real
//! implementation lives in [`crate::qdrant`], and tests plug in in-memory
//! fakes.

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::config::DistanceKind;
use crate::errors::IngestError;

/// Schema of the collection's single named vector field. Immutable for the
/// lifetime of a collection; any change requires full recreation.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpec {
    /// Key under which vectors are stored and queried.
    pub vector_name: String,
    /// Vector dimensionality.
    pub size: u64,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Point identity as the store sees it: dense numeric ids for dataset
/// points, deterministic UUIDs for memory facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointKey {
    Num(u64),
    Uuid(String),
}

/// A fully resolved point ready for transmission.
#[derive(Debug, Clone)]
pub struct StoredPoint {
    pub id: PointKey,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// Collection status as the readiness gate needs it: every accepted write
/// indexed and visible, or not yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexHealth {
    Ready,
    Pending,
}

/// One ranked result of a similarity query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: PointKey,
    pub score: f32,
    /// Rendered document text from the payload, when present.
    pub document: Option<String>,
}

/// Store operations the pipeline consumes. One implementor wraps one
/// collection; the collection name is fixed at construction.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Whether the collection currently exists.
    async fn exists(&self) -> Result<bool, IngestError>;

    /// Drop the collection and everything in it.
    async fn destroy(&self) -> Result<(), IngestError>;

    /// Create the collection with the given vector schema.
    async fn create(&self, spec: &VectorSpec) -> Result<(), IngestError>;

    /// Write a batch of points. Overwrite-by-id semantics; returns the
    /// number of points transmitted.
    async fn upsert(&self, points: Vec<StoredPoint>) -> Result<usize, IngestError>;

    /// Current indexing status of the collection.
    async fn health(&self) -> Result<IndexHealth, IngestError>;

    /// Top-`limit` similarity query against the named vector field.
    async fn search(&self, vector: Vec<f32>, limit: u64) -> Result<Vec<SearchHit>, IngestError>;
}

/// Full-refresh provisioning: drop the collection if present, then create
/// it fresh with the declared schema.
///
/// Idempotent in effect (the end state is always a fresh empty collection)
/// but destructive: callers must treat this as a reset, never an upsert.
pub async fn provision(index: &dyn VectorIndex, spec: &VectorSpec) -> Result<(), IngestError> {
    if index.exists().await? {
        info!(vector_name = %spec.vector_name, "dropping existing collection");
        index.destroy().await?;
    }
    index.create(spec).await?;
    info!(
        vector_name = %spec.vector_name,
        size = spec.size,
        distance = ?spec.distance,
        "collection created"
    );
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeIndex;
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn provision_creates_when_absent() {
        let index = FakeIndex::default();
        let spec = VectorSpec {
            vector_name: "fast-bge-m3".into(),
            size: 4,
            distance: DistanceKind::Cosine,
        };
        provision(&index, &spec).await.unwrap();
        assert_eq!(index.destroys.load(Ordering::SeqCst), 0);
        assert_eq!(index.spec.lock().unwrap().as_ref(), Some(&spec));
    }

    #[tokio::test]
    async fn provision_twice_always_ends_fresh() {
        let index = FakeIndex::default();
        let spec = VectorSpec {
            vector_name: "fast-bge-m3".into(),
            size: 4,
            distance: DistanceKind::Cosine,
        };

        provision(&index, &spec).await.unwrap();
        index
            .upsert(vec![StoredPoint {
                id: PointKey::Num(0),
                vector: vec![0.0; 4],
                payload: serde_json::json!({}),
            }])
            .await
            .unwrap();

        provision(&index, &spec).await.unwrap();
        assert_eq!(index.destroys.load(Ordering::SeqCst), 1);
        assert!(index.points.lock().unwrap().is_empty());
        assert_eq!(index.spec.lock().unwrap().as_ref(), Some(&spec));
    }
}
