//! Embedding configuration types.

use docbrain_core::config::EmbeddingSettings;
use serde::{Deserialize, Serialize};

/// Embedding configuration for one provider instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "openai", "ollama", "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom service endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Maximum texts per embedding request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
            batch_size: default_batch_size(),
        }
    }
}

impl EmbeddingConfig {
    /// Offline configuration backed by the trigram mock.
    pub fn mock(dimensions: usize) -> Self {
        Self {
            provider: "mock".to_string(),
            model: "trigram-v1".to_string(),
            dimensions,
            endpoint: None,
            batch_size: default_batch_size(),
        }
    }

    /// Build from the application settings.
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            provider: settings.provider.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            endpoint: settings.endpoint.clone(),
            batch_size: default_batch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "text-embedding-3-small");
        assert_eq!(config.dimensions, 1536);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_from_settings() {
        let settings = EmbeddingSettings {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            endpoint: Some("http://gpu-box:11434".to_string()),
        };

        let config = EmbeddingConfig::from_settings(&settings);
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.dimensions, 768);
        assert_eq!(config.endpoint.as_deref(), Some("http://gpu-box:11434"));
    }
}
