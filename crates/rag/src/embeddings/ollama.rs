//! Ollama embedding backend.
//!
//! A single-call JSON exchange with the local Ollama API: POST
//! `{model, prompt}` to `/api/embeddings`, receive `{embedding: [..]}`.

use std::time::Duration;

use hindsight_core::{AppConfig, Error, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embeddings::provider::EmbeddingProvider;

/// Per-request timeout. Embedding a short prompt typically takes ~200 ms;
/// anything near this cap means the service is wedged, not slow.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedding provider backed by Ollama's local API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    /// Create a provider targeting the given endpoint and model.
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }

    /// Create a provider from the application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.embed_url.clone(), config.embed_model.clone())
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::EmbedTimeout
        } else if err.is_connect() {
            Error::EmbedServiceUnreachable {
                endpoint: self.url.clone(),
            }
        } else {
            Error::EmbedProtocol(format!("request failed: {err}"))
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.model,
            prompt: text,
        };

        debug!(url = %self.url, model = %self.model, text_len = text.len(), "embedding request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_api_error(status, &body, &self.model));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::EmbedProtocol(format!("malformed embedding response: {e}")))?;

        if parsed.embedding.is_empty() {
            return Err(Error::EmbedEmpty);
        }

        Ok(parsed.embedding)
    }
}

/// Map a non-success status and its body onto a typed error. A body that
/// mentions an unknown model becomes the friendlier model-missing variant
/// naming the exact pull command.
fn classify_api_error(status: StatusCode, body: &str, model: &str) -> Error {
    if body.contains("model") && body.contains("not found") {
        Error::EmbedModelMissing {
            model: model.to_string(),
        }
    } else {
        Error::EmbedProtocol(format!("unexpected status {status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_body_maps_to_model_missing() {
        let err = classify_api_error(
            StatusCode::NOT_FOUND,
            r#"{"error":"model 'nomic-embed-text' not found, try pulling it first"}"#,
            "nomic-embed-text",
        );
        match err {
            Error::EmbedModelMissing { model } => assert_eq!(model, "nomic-embed-text"),
            other => panic!("expected EmbedModelMissing, got {other:?}"),
        }
    }

    #[test]
    fn other_statuses_map_to_protocol_error() {
        let err = classify_api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom", "m");
        match err {
            Error::EmbedProtocol(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("expected EmbedProtocol, got {other:?}"),
        }
    }
}
