//! LLM integration crate for DocBrain.
//!
//! This crate provides a provider-agnostic abstraction for completion
//! services. It supports multiple providers through a unified trait-based
//! interface.
//!
//! # Providers
//! - **OpenAI**: Chat completions API (default)
//! - **Ollama**: Local LLM runtime
//! - **Mock**: Scripted responses for tests and offline runs
//!
//! # Example
//! ```no_run
//! use docbrain_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{MockLlmClient, OllamaClient, OpenAiClient};
pub use types::ProviderType;
