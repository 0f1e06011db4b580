//! Configuration for one model endpoint.

/// Configuration for a single model behind an OpenAI-compatible API.
///
/// The same shape serves both chat and embedding models; the caller decides
/// which client to construct from it.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier string (e.g., `"gpt-4o-mini"`, `"bge-m3"`).
    pub model: String,

    /// API base URL (e.g., `"https://api.openai.com"`). Version prefixes
    /// are appended by the clients.
    pub endpoint: String,

    /// Optional bearer token for providers that require authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate (chat only).
    pub max_tokens: Option<u32>,

    /// Sampling temperature (chat only).
    pub temperature: Option<f32>,

    /// Request timeout in seconds; defaults to 60 when unset.
    pub timeout_secs: Option<u64>,
}

impl LlmConfig {
    /// Minimal config for the given model and endpoint.
    pub fn new(model: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
        }
    }

    /// Attach an API key.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }
}
