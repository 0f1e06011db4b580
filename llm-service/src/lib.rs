//! OpenAI-compatible HTTP clients used across the backend.
//!
//! Two thin, non-streaming clients share one configuration shape:
//! - [`chat::ChatClient`]: `POST {endpoint}/v1/chat/completions`, with
//!   optional tool definitions and `tool_calls` in the reply.
//! - [`embeddings::EmbeddingClient`]: `POST {endpoint}/v1/embeddings`,
//!   single or batched inputs.
//!
//! Errors are normalized into [`errors::LlmError`]; construction validates
//! the endpoint scheme and builds a preconfigured `reqwest::Client`.

pub mod chat;
pub mod config;
pub mod embeddings;
pub mod errors;

pub use chat::{ChatClient, ChatMessage, ChatTurn, ToolCall, ToolSpec};
pub use config::LlmConfig;
pub use embeddings::EmbeddingClient;
pub use errors::LlmError;
