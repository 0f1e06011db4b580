//! Non-streaming chat completion client with tool-calling support.
//!
//! Implements a thin client for `POST {endpoint}/v1/chat/completions`:
//! the caller owns the message history, passes it in full on every turn,
//! and receives either final text or a set of tool calls to execute.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::LlmConfig;
use crate::errors::{LlmError, make_snippet};

/// One message in a chat history.
///
/// Covers all four OpenAI roles; optional fields stay off the wire when
/// unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    /// Tool result message, answering the tool call with the given id.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".into(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// A tool definition advertised to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ToolFunction,
}

/// Function schema inside a [`ToolSpec`].
#[derive(Debug, Clone, Serialize)]
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: Value,
}

impl ToolSpec {
    /// Function tool with the given name, description, and JSON Schema.
    pub fn function(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            kind: "function".into(),
            function: ToolFunction {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ToolCallFunction,
}

/// Name and raw JSON arguments of a requested invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    /// Arguments as a JSON-encoded string, exactly as returned by the API.
    pub arguments: String,
}

/// Outcome of one chat turn: final text, tool calls, or both.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatTurn {
    /// Rebuild the assistant message for appending to the history.
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            role: "assistant".into(),
            content: self.content.clone(),
            tool_calls: if self.tool_calls.is_empty() {
                None
            } else {
                Some(self.tool_calls.clone())
            },
            tool_call_id: None,
        }
    }
}

/// Thin client for `/v1/chat/completions`.
///
/// Constructed from a complete [`LlmConfig`]. Keeps a preconfigured
/// `reqwest::Client` with timeout and default headers.
#[derive(Debug)]
pub struct ChatClient {
    client: reqwest::Client,
    cfg: LlmConfig,
    url_chat: String,
}

impl ChatClient {
    /// Creates a new [`ChatClient`] from the given config.
    ///
    /// # Errors
    /// - [`LlmError::InvalidEndpoint`] if `cfg.endpoint` is empty or not http(s)
    /// - [`LlmError::InvalidApiKey`] if the key cannot form a header value
    /// - [`LlmError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmConfig) -> Result<Self, LlmError> {
        let (client, base) = build_http_client(&cfg)?;
        let url_chat = format!("{base}/v1/chat/completions");

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.timeout_secs.unwrap_or(60),
            "ChatClient initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Performs one non-streaming chat completion turn.
    ///
    /// Pass an empty `tools` slice to disable tool calling for the turn.
    ///
    /// # Errors
    /// - [`LlmError::HttpStatus`] for non-2xx responses
    /// - [`LlmError::Transport`] for client/network failures
    /// - [`LlmError::Decode`] if the JSON cannot be parsed
    /// - [`LlmError::EmptyChoices`] if no choices are returned
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatTurn, LlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest {
            model: &self.cfg.model,
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            temperature: self.cfg.temperature,
            max_tokens: self.cfg.max_tokens,
        };

        debug!(
            model = %self.cfg.model,
            messages = messages.len(),
            tools = tools.len(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );

            return Err(LlmError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let out: ChatCompletionResponse = resp.json().await.map_err(|e| {
            LlmError::Decode(format!(
                "serde error: {e}; expected `choices[0].message`"
            ))
        })?;

        let message = out
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(LlmError::EmptyChoices)?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            tool_calls = message.tool_calls.as_ref().map_or(0, Vec::len),
            "chat completion finished"
        );

        Ok(ChatTurn {
            content: message.content,
            tool_calls: message.tool_calls.unwrap_or_default(),
        })
    }
}

/// Builds the shared HTTP client: timeout, JSON content type, optional
/// bearer auth. Returns the client and the trimmed base URL.
pub(crate) fn build_http_client(cfg: &LlmConfig) -> Result<(reqwest::Client, String), LlmError> {
    let endpoint = cfg.endpoint.trim();
    if endpoint.is_empty() || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
    {
        return Err(LlmError::InvalidEndpoint(cfg.endpoint.clone()));
    }

    let timeout = cfg
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(60));

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    if let Some(key) = &cfg.api_key {
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| LlmError::InvalidApiKey(e.to_string()))?,
        );
    }

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()?;

    Ok((client, endpoint.trim_end_matches('/').to_string()))
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for `/v1/chat/completions` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_skips_unset_fields() {
        let messages = vec![ChatMessage::user("hi")];
        let req = ChatCompletionRequest {
            model: "m",
            messages: &messages,
            tools: None,
            temperature: None,
            max_tokens: None,
        };
        let v = serde_json::to_value(&req).unwrap();
        let obj = v.as_object().unwrap();
        assert!(!obj.contains_key("tools"));
        assert!(!obj.contains_key("temperature"));
        assert!(!obj.contains_key("max_tokens"));
        assert!(!v["messages"][0].as_object().unwrap().contains_key("tool_calls"));
    }

    #[test]
    fn response_with_tool_calls_decodes() {
        let raw = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "memory_store",
                            "arguments": "{\"information\":\"x\"}"
                        }
                    }]
                }
            }]
        });
        let out: ChatCompletionResponse = serde_json::from_value(raw).unwrap();
        let msg = &out.choices[0].message;
        assert!(msg.content.is_none());
        let calls = msg.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "memory_store");
    }

    #[test]
    fn assistant_message_round_trips_tool_calls() {
        let turn = ChatTurn {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".into(),
                kind: "function".into(),
                function: ToolCallFunction {
                    name: "memory_find".into(),
                    arguments: "{\"query\":\"secret\"}".into(),
                },
            }],
        };
        let msg = turn.to_message();
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.tool_calls.as_ref().unwrap().len(), 1);

        let empty = ChatTurn {
            content: Some("done".into()),
            tool_calls: Vec::new(),
        };
        assert!(empty.to_message().tool_calls.is_none());
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let cfg = LlmConfig::new("m", "localhost:11434");
        assert!(matches!(
            ChatClient::new(cfg),
            Err(LlmError::InvalidEndpoint(_))
        ));
    }
}
