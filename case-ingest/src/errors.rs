//! Unified error type for the case-ingest crate.

use thiserror::Error;

/// Errors produced by the ingestion pipeline.
///
/// Every variant is fatal: the pipeline is all-or-nothing per run, and an
/// aborted run leaves the collection in a state that must be treated as
/// invalid until the next full run.
#[derive(Debug, Error)]
pub enum IngestError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Required environment variable is missing.
    #[error("missing env variable: {key}")]
    EnvMissing { key: String },

    /// Failed to parse an environment variable into the expected type.
    #[error("failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Dataset acquisition ─────────────────────────────────────────────────
    /// Dataset could not be fetched or decoded.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// A record cannot be normalized into document text. Aborts the run:
    /// skipping records would leave gaps in the dense point-id space.
    #[error("record {index} cannot be normalized: {reason}")]
    MalformedRecord { index: usize, reason: String },

    // ── Embeddings backend ──────────────────────────────────────────────────
    /// Embedding backend failed to initialize or to embed inputs.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Returned vector dimensionality does not match the collection schema.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    // ── Store interaction ───────────────────────────────────────────────────
    /// The store rejected the collection schema or is unreachable.
    #[error("provisioning error: {0}")]
    Provisioning(String),

    /// A batch failed to transmit.
    #[error("upload error: {0}")]
    Upload(String),

    /// The collection never reported ready within the poll budget.
    #[error("collection not ready after {waited_secs}s")]
    ReadinessTimeout { waited_secs: u64 },

    /// The post-upload probe found the collection not queryable as expected.
    #[error("verification failed: {0}")]
    Verification(String),
}
