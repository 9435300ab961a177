//! Ollama Embedding Provider
//!
//! Provides semantic embeddings via Ollama's local API using models like
//! nomic-embed-text (768 dimensions). Ollama has no batch endpoint, so
//! batches are embedded one text at a time.

use super::status_error;
use crate::embeddings::provider::{check_vectors, EmbeddingProvider};
use crate::embeddings::EmbeddingConfig;
use docbrain_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

/// Request payload for Ollama embeddings API
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from Ollama embeddings API
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Error response from Ollama API
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider from configuration.
    ///
    /// No request is made until the first embedding.
    pub fn new(config: &EmbeddingConfig) -> Self {
        let base_url = config
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::EmbeddingUnavailable(format!("Failed to send request to Ollama: {}", e))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let detail = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(status_error("Ollama", status, &detail));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingUnavailable(format!("Failed to parse Ollama response: {}", e))
        })?;

        Ok(body.embedding)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn batch_size(&self) -> usize {
        1
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!("Embedding batch of {} texts", texts.len());

        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_single(text).await?);
        }

        check_vectors(&embeddings, texts.len(), self.dimensions)?;
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_defaults() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            ..Default::default()
        };

        let provider = OllamaProvider::new(&config);
        assert_eq!(provider.base_url, DEFAULT_OLLAMA_URL);
        assert_eq!(provider.dimensions(), 768);
        assert_eq!(provider.model_name(), "nomic-embed-text");
    }

    #[test]
    fn test_ollama_custom_endpoint() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            endpoint: Some("http://gpu-box:11434/".to_string()),
            ..Default::default()
        };

        let provider = OllamaProvider::new(&config);
        assert_eq!(provider.base_url, "http://gpu-box:11434");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let config = EmbeddingConfig {
            provider: "ollama".to_string(),
            // Port 9 (discard) is closed on test machines
            endpoint: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        };

        let provider = OllamaProvider::new(&config);
        let result = provider.embed_batch(&["hello".to_string()]).await;
        assert!(matches!(result, Err(AppError::EmbeddingUnavailable(_))));
    }
}
