//! Error types for DocBrain.
//!
//! Only infrastructure failures are represented here. Expected outcomes such as
//! a too-short question or an empty index are modeled as guidance values by the
//! knowledge crate and never travel through `AppError`.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for DocBrain.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input handed to the library (e.g. an ingestion without a source name)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The embedding service could not produce vectors
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The completion service failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// A model service rejected the configured credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// An external call exceeded its time budget
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: String,
        after: Duration,
    },

    /// Vector index persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Create a timeout error for the named operation.
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        AppError::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Whether retrying the same call later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Timeout { .. } | AppError::EmbeddingUnavailable(_) | AppError::Llm(_)
        )
    }

    /// Short message suitable for a chat surface.
    ///
    /// Distinguishes credential problems from network problems so the user
    /// knows which one to fix.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Auth(_) => {
                "The model service rejected your credentials. Please check your API key and try again."
            }
            AppError::Timeout { .. } => {
                "The model service took too long to respond. Please try again in a moment."
            }
            AppError::EmbeddingUnavailable(_) | AppError::Llm(_) => {
                "The model service is unreachable right now. Please check your connection and try again."
            }
            AppError::Storage(_) | AppError::Io(_) => {
                "Your documents could not be saved to disk. Please check available space and permissions."
            }
            AppError::InvalidInput(_) => "That document could not be processed.",
            AppError::Config(_) | AppError::Prompt(_) | AppError::Serialization(_) => {
                "DocBrain is misconfigured. Please review your settings."
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
