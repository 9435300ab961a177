//! LLM provider factory.
//!
//! This module creates completion clients from application configuration.
//! It handles provider resolution and secret injection.

use crate::client::LlmClient;
use crate::providers::{MockLlmClient, OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use docbrain_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns a configuration error if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;
    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    match provider_type {
        ProviderType::OpenAI => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            Ok(Arc::new(OpenAiClient::with_base_url(base_url, key)))
        }
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_base_url(base_url))),
        ProviderType::Mock => Ok(Arc::new(MockLlmClient::new())),
    }
}
