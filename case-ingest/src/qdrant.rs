//! Qdrant-backed implementation of the [`VectorIndex`] seam.
//!
//! Concentrates all `qdrant_client` usage behind the trait: gRPC
//! connection, collection lifecycle, named-vector upserts, status reads,
//! and top-K search. Nothing else in the crate touches the client API.

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CollectionStatus, CreateCollectionBuilder, Distance, NamedVectors, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder, VectorsConfigBuilder,
    point_id::PointIdOptions,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::config::{DistanceKind, IngestConfig};
use crate::errors::IngestError;
use crate::store::{IndexHealth, PointKey, SearchHit, StoredPoint, VectorIndex, VectorSpec};

/// One Qdrant collection with one named vector field.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    vector_name: String,
}

impl QdrantIndex {
    /// Connect to the configured Qdrant instance, targeting the run's
    /// ingestion collection.
    ///
    /// This call does not touch any collections.
    ///
    /// # Errors
    /// Returns `IngestError::Provisioning` if the client cannot be built.
    pub fn connect(cfg: &IngestConfig) -> Result<Self, IngestError> {
        Self::with_collection(cfg, &cfg.collection)
    }

    /// Connect targeting an arbitrary collection (e.g., the agent memory
    /// collection), with the same vector field naming as the run config.
    pub fn with_collection(cfg: &IngestConfig, collection: &str) -> Result<Self, IngestError> {
        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IngestError::Provisioning(format!("client build: {e}")))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            vector_name: cfg.vector_name(),
        })
    }

    fn to_point_struct(&self, point: StoredPoint) -> Result<PointStruct, IngestError> {
        let payload: Payload = point
            .payload
            .try_into()
            .map_err(|e| IngestError::Upload(format!("payload convert: {e}")))?;

        let vectors = NamedVectors::default().add_vector(self.vector_name.clone(), point.vector);

        let id: PointId = match point.id {
            PointKey::Num(n) => n.into(),
            PointKey::Uuid(u) => u.into(),
        };

        Ok(PointStruct::new(id, vectors, payload))
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn exists(&self) -> Result<bool, IngestError> {
        self.client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| IngestError::Provisioning(format!("collection_exists: {e}")))
    }

    async fn destroy(&self) -> Result<(), IngestError> {
        self.client
            .delete_collection(&self.collection)
            .await
            .map_err(|e| IngestError::Provisioning(format!("delete_collection: {e}")))?;
        Ok(())
    }

    async fn create(&self, spec: &VectorSpec) -> Result<(), IngestError> {
        let distance = match spec.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        let mut vectors = VectorsConfigBuilder::default();
        vectors.add_named_vector_params(
            &spec.vector_name,
            VectorParamsBuilder::new(spec.size, distance),
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(vectors),
            )
            .await
            .map_err(|e| IngestError::Provisioning(format!("create_collection: {e}")))?;

        Ok(())
    }

    async fn upsert(&self, points: Vec<StoredPoint>) -> Result<usize, IngestError> {
        if points.is_empty() {
            return Ok(0);
        }

        let structs = points
            .into_iter()
            .map(|p| self.to_point_struct(p))
            .collect::<Result<Vec<_>, _>>()?;
        let count = structs.len();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, structs))
            .await
            .map_err(|e| IngestError::Upload(format!("upsert_points: {e}")))?;

        debug!(count, collection = %self.collection, "points upserted");
        Ok(count)
    }

    async fn health(&self) -> Result<IndexHealth, IngestError> {
        let resp = self
            .client
            .collection_info(&self.collection)
            .await
            .map_err(|e| IngestError::Provisioning(format!("collection_info: {e}")))?;

        let info = resp
            .result
            .ok_or_else(|| IngestError::Provisioning("empty collection info".into()))?;

        // Green means every accepted write is indexed and visible.
        if info.status() == CollectionStatus::Green {
            Ok(IndexHealth::Ready)
        } else {
            Ok(IndexHealth::Pending)
        }
    }

    async fn search(&self, vector: Vec<f32>, limit: u64) -> Result<Vec<SearchHit>, IngestError> {
        let resp = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector, limit)
                    .vector_name(&self.vector_name)
                    .with_payload(true),
            )
            .await
            .map_err(|e| IngestError::Verification(format!("search_points: {e}")))?;

        Ok(resp.result.into_iter().map(scored_point_to_hit).collect())
    }
}

/// Map a Qdrant `ScoredPoint` into a [`SearchHit`], extracting the stored
/// document text best-effort.
fn scored_point_to_hit(sp: qdrant_client::qdrant::ScoredPoint) -> SearchHit {
    let id = match sp.id.and_then(|pid| pid.point_id_options) {
        Some(PointIdOptions::Num(n)) => PointKey::Num(n),
        Some(PointIdOptions::Uuid(u)) => PointKey::Uuid(u),
        None => PointKey::Uuid(String::new()),
    };

    let document = sp
        .payload
        .get("document")
        .and_then(|v| v.clone().into_json().as_str().map(str::to_owned));

    SearchHit {
        id,
        score: sp.score,
        document,
    }
}
