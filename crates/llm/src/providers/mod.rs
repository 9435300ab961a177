//! Completion provider implementations.

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::MockLlmClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use docbrain_core::AppError;
use reqwest::StatusCode;

/// Map a non-success HTTP status to an error, keeping credential failures apart.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: String) -> AppError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AppError::Auth(format!("{} rejected credentials ({})", provider, status))
    } else {
        AppError::Llm(format!("{} API error ({}): {}", provider, status, body))
    }
}

/// Map a transport failure. Deadlines are enforced by callers, not by reqwest.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> AppError {
    AppError::Llm(format!("Failed to send request to {}: {}", provider, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_separates_auth() {
        let auth = status_error("OpenAI", StatusCode::UNAUTHORIZED, String::new());
        assert!(matches!(auth, AppError::Auth(_)));

        let server = status_error("OpenAI", StatusCode::BAD_GATEWAY, "upstream".to_string());
        assert!(matches!(server, AppError::Llm(ref m) if m.contains("upstream")));
    }

    #[tokio::test]
    async fn test_transport_error_names_provider() {
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .unwrap_err();

        let mapped = transport_error("Ollama", err);
        assert!(matches!(mapped, AppError::Llm(ref m) if m.starts_with("Failed to send request to Ollama")));
    }
}
