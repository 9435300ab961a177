//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingConfig;
use crate::embeddings::providers::{MockProvider, OllamaProvider, OpenAiProvider};
use docbrain_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Implementations never retry; a failed call surfaces immediately.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Most texts sent in one upstream request.
    ///
    /// Callers that enforce a per-request deadline split batches to this size.
    fn batch_size(&self) -> usize {
        usize::MAX
    }

    /// Generate embeddings for multiple texts, one vector per input in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate the embedding for a query.
    async fn embed_query(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::EmbeddingUnavailable("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub fn create_provider(
    config: &EmbeddingConfig,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if config.dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    match config.provider.as_str() {
        "mock" => Ok(Arc::new(MockProvider::new(config.dimensions))),

        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires API key".to_string())
            })?;
            Ok(Arc::new(OpenAiProvider::new(config, key)))
        }

        "ollama" => Ok(Arc::new(OllamaProvider::new(config))),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: mock, openai, ollama",
            config.provider
        ))),
    }
}

/// Verify a provider response lines up with its request.
pub(crate) fn check_vectors(
    vectors: &[Vec<f32>],
    expected_count: usize,
    dimensions: usize,
) -> AppResult<()> {
    if vectors.len() != expected_count {
        return Err(AppError::EmbeddingUnavailable(format!(
            "Expected {} embeddings, got {}",
            expected_count,
            vectors.len()
        )));
    }

    if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
        return Err(AppError::EmbeddingUnavailable(format!(
            "Unexpected embedding dimensions: got {}, expected {}",
            bad.len(),
            dimensions
        )));
    }

    Ok(())
}
