//! Runtime configuration loaded from environment variables.
//!
//! Everything is read once at startup into [`IngestConfig`] and passed by
//! reference into the pipeline stages; components never re-read the
//! environment themselves. Required keys fail fast before any network call.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::IngestError;

/// Default dataset to ingest when `DATASET_NAME` is unset.
pub const DEFAULT_DATASET: &str = "SnehaDeshmukh/IndianBailJudgments-1200";

/// Distance metric for the collection's vector space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DistanceKind {
    Cosine,
    Dot,
    Euclid,
}

impl DistanceKind {
    /// Parse from a metric name (case-insensitive). Unknown names are a
    /// configuration error, not a silent default.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Some(DistanceKind::Cosine),
            "dot" | "dotproduct" => Some(DistanceKind::Dot),
            "euclid" | "l2" => Some(DistanceKind::Euclid),
            _ => None,
        }
    }
}

/// Name of the vector field derived from the embedding model identifier.
///
/// Must be the same pure function at write and query time: the lowercased
/// last path segment of the model name, prefixed.
pub fn vector_field_name(model: &str) -> String {
    let tail = model.rsplit('/').next().unwrap_or(model);
    format!("fast-{}", tail.to_lowercase())
}

/// Top-level runtime configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Qdrant gRPC URL (e.g., `http://localhost:6334`).
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name, recreated from scratch on every run.
    pub collection: String,
    /// Vector distance metric.
    pub distance: DistanceKind,
    /// Dimensionality of the collection's single named vector field.
    pub vector_size: u64,
    /// Embedding model identifier; also determines the vector field name.
    pub embedding_model: String,
    /// Base URL of the OpenAI-compatible embeddings API.
    pub embedding_url: String,
    /// Optional API key for the embeddings API.
    pub embedding_api_key: Option<String>,
    /// Hugging Face dataset identifier.
    pub dataset: String,
    /// Points per upload batch.
    pub batch_size: usize,
    /// Max upload batches in flight at once.
    pub upload_parallel: usize,
    /// Interval between collection status polls.
    pub ready_poll: Duration,
    /// Total budget for the readiness wait.
    pub ready_timeout: Duration,
}

impl IngestConfig {
    /// Build configuration from process environment variables.
    ///
    /// Required: `QDRANT_URL`, `COLLECTION_NAME`, `EMBEDDING_MODEL`,
    /// `VECTOR_SIZE`. Everything else has a default.
    pub fn from_env() -> Result<Self, IngestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, IngestError> {
        let distance = match lookup("DISTANCE_METRIC") {
            None => DistanceKind::Cosine,
            Some(v) => DistanceKind::parse(&v).ok_or(IngestError::EnvParse {
                key: "DISTANCE_METRIC".into(),
                value: v,
            })?,
        };

        let cfg = Self {
            qdrant_url: require(&lookup, "QDRANT_URL")?,
            qdrant_api_key: lookup("QDRANT_API_KEY"),
            collection: require(&lookup, "COLLECTION_NAME")?,
            distance,
            vector_size: parse_required(&lookup, "VECTOR_SIZE")?,
            embedding_model: require(&lookup, "EMBEDDING_MODEL")?,
            embedding_url: lookup("EMBEDDING_URL")
                .unwrap_or_else(|| "http://localhost:11434".into()),
            embedding_api_key: lookup("EMBEDDING_API_KEY"),
            dataset: lookup("DATASET_NAME").unwrap_or_else(|| DEFAULT_DATASET.into()),
            batch_size: parse_or(&lookup, "BATCH_SIZE", 64)?,
            upload_parallel: parse_or(&lookup, "UPLOAD_PARALLEL", 16)?,
            ready_poll: Duration::from_millis(parse_or(&lookup, "READY_POLL_MS", 1000)?),
            ready_timeout: Duration::from_secs(parse_or(&lookup, "READY_TIMEOUT_SECS", 300)?),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    /// Vector field name for this run's embedding model.
    pub fn vector_name(&self) -> String {
        vector_field_name(&self.embedding_model)
    }

    fn validate(&self) -> Result<(), IngestError> {
        if self.vector_size == 0 {
            return Err(IngestError::InvalidConfig("VECTOR_SIZE must be > 0".into()));
        }
        if self.batch_size == 0 {
            return Err(IngestError::InvalidConfig("BATCH_SIZE must be > 0".into()));
        }
        if self.upload_parallel == 0 {
            return Err(IngestError::InvalidConfig(
                "UPLOAD_PARALLEL must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Read a required string key.
fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, IngestError> {
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(IngestError::EnvMissing { key: key.into() }),
    }
}

/// Read a required numeric key.
fn parse_required<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<T, IngestError> {
    let v = require(lookup, key)?;
    v.parse::<T>().map_err(|_| IngestError::EnvParse {
        key: key.into(),
        value: v,
    })
}

/// Read an optional numeric key with a default.
fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, IngestError> {
    match lookup(key) {
        None => Ok(default),
        Some(v) => v.parse::<T>().map_err(|_| IngestError::EnvParse {
            key: key.into(),
            value: v,
        }),
    }
}
