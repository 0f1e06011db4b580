//! Configuration for the memory-agent demo.

use llm_service::LlmConfig;

use crate::errors::MemoryError;

/// Settings the demo needs on top of the ingestion config: the persistent
/// memory collection and the chat model driving the agent.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Collection holding remembered facts. Created if absent, never
    /// dropped; persistence is the point.
    pub collection: String,
    /// Chat model behind the agent loop.
    pub chat: LlmConfig,
}

impl MemoryConfig {
    /// Build from process environment variables.
    ///
    /// Required: `CHAT_MODEL`. Defaults: `MEMORY_COLLECTION=agent_memory`,
    /// `CHAT_URL=http://localhost:11434`.
    pub fn from_env() -> Result<Self, MemoryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MemoryError> {
        let model = match lookup("CHAT_MODEL") {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                return Err(MemoryError::EnvMissing {
                    key: "CHAT_MODEL".into(),
                });
            }
        };

        let endpoint =
            lookup("CHAT_URL").unwrap_or_else(|| "http://localhost:11434".into());

        Ok(Self {
            collection: lookup("MEMORY_COLLECTION").unwrap_or_else(|| "agent_memory".into()),
            chat: LlmConfig::new(model, endpoint).with_api_key(lookup("CHAT_API_KEY")),
        })
    }
}
