//! Embeddings retrieval client.
//!
//! Thin client for `POST {endpoint}/v1/embeddings`. Supports single and
//! batched inputs; batched responses are reordered by the `index` field so
//! output order always matches input order.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::chat::build_http_client;
use crate::config::LlmConfig;
use crate::errors::{LlmError, make_snippet};

/// Thin client for `/v1/embeddings`.
#[derive(Debug)]
pub struct EmbeddingClient {
    client: reqwest::Client,
    cfg: LlmConfig,
    url_embeddings: String,
}

impl EmbeddingClient {
    /// Creates a new [`EmbeddingClient`] from the given config.
    ///
    /// # Errors
    /// Same construction errors as [`crate::chat::ChatClient::new`].
    pub fn new(cfg: LlmConfig) -> Result<Self, LlmError> {
        let (client, base) = build_http_client(&cfg)?;
        let url_embeddings = format!("{base}/v1/embeddings");

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            "EmbeddingClient initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_embeddings,
        })
    }

    /// Model identifier this client embeds with.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Retrieves a single embedding vector.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        let inputs = [input.to_string()];
        let mut out = self.embed_many(&inputs).await?;
        out.pop()
            .ok_or_else(|| LlmError::Decode("empty `data` in embeddings response".into()))
    }

    /// Retrieves embeddings for a batch of inputs, in input order.
    ///
    /// # Errors
    /// - [`LlmError::HttpStatus`] for non-2xx responses
    /// - [`LlmError::Transport`] for client/network failures
    /// - [`LlmError::Decode`] if the JSON cannot be parsed or the response
    ///   does not carry one vector per input
    pub async fn embed_many(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input: inputs,
        };

        debug!(
            model = %self.cfg.model,
            inputs = inputs.len(),
            "POST {}", self.url_embeddings
        );

        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "embeddings returned non-success status"
            );

            return Err(LlmError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            LlmError::Decode(format!("serde error: {e}; expected `data[].embedding`"))
        })?;

        if out.data.len() != inputs.len() {
            return Err(LlmError::Decode(format!(
                "embeddings response carried {} vectors for {} inputs",
                out.data.len(),
                inputs.len()
            )));
        }

        let mut data = out.data;
        data.sort_by_key(|d| d.index);

        info!(
            model = %self.cfg.model,
            inputs = inputs.len(),
            latency_ms = started.elapsed().as_millis(),
            "embeddings finished"
        );

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_rows_reorder_by_index() {
        let raw = json!({
            "data": [
                { "index": 1, "embedding": [1.0] },
                { "index": 0, "embedding": [0.0] }
            ]
        });
        let out: EmbeddingsResponse = serde_json::from_value(raw).unwrap();
        let mut data = out.data;
        data.sort_by_key(|d| d.index);
        assert_eq!(data[0].embedding, vec![0.0]);
        assert_eq!(data[1].embedding, vec![1.0]);
    }
}
