//! Embedding provider implementations.

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use docbrain_core::AppError;
use reqwest::StatusCode;

/// Map a non-success HTTP status, keeping credential failures apart.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AppError::Auth(format!("{} rejected credentials ({})", provider, status))
    } else {
        AppError::EmbeddingUnavailable(format!("{} API error ({}): {}", provider, status, body))
    }
}
