//! Scripted completion client for tests and offline runs.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docbrain_core::AppResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Responder = Arc<dyn Fn(&LlmRequest) -> AppResult<String> + Send + Sync>;

/// Completion client that answers through a closure and counts its calls.
#[derive(Clone)]
pub struct MockLlmClient {
    responder: Responder,
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    /// Echo a fixed acknowledgement naming the question.
    pub fn new() -> Self {
        Self::with_responder(|request| Ok(format!("Mock answer to: {}", request.prompt)))
    }

    /// Always answer with `text`.
    pub fn with_response(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::with_responder(move |_| Ok(text.clone()))
    }

    /// Answer through an arbitrary closure, which may also fail.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&LlmRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = (self.responder)(request)?;

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}
