//! Embedding boundary for the knowledge pipeline.
//!
//! Provides provider-agnostic embedding generation behind
//! [`EmbeddingProvider`], with OpenAI, Ollama and offline mock adapters.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
pub use providers::MockProvider;
