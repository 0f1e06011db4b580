//! Unified error type for the agent-memory crate.

use thiserror::Error;

/// Errors produced by the memory store and the agent loop.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Required environment variable is missing.
    #[error("missing env variable: {key}")]
    EnvMissing { key: String },

    /// Chat/embedding service failure.
    #[error(transparent)]
    Llm(#[from] llm_service::LlmError),

    /// Vector store failure, surfaced through the shared store seam.
    #[error(transparent)]
    Index(#[from] case_ingest::IngestError),

    /// The model requested a tool with arguments we cannot decode.
    #[error("bad arguments for tool `{tool}`: {reason}")]
    BadToolArgs { tool: String, reason: String },

    /// The model never produced a final text answer.
    #[error("agent produced no final answer after {0} rounds")]
    NoAnswer(usize),
}
