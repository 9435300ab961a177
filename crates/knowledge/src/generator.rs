//! Grounded answer generation.
//!
//! Builds the grounded system prompt around retrieved context and sends a
//! single-turn completion. No retries and no caching.

use crate::deadline::with_deadline;
use docbrain_core::AppResult;
use docbrain_llm::{LlmClient, LlmRequest};
use docbrain_prompt::{build_grounded_prompt, PromptDefinition};
use std::sync::Arc;
use std::time::Duration;

pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    temperature: f32,
    request_timeout: Duration,
}

impl AnswerGenerator {
    /// Create a generator that samples at the prompt's own temperature.
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        request_timeout: Duration,
    ) -> Self {
        let temperature = prompt.behavior.temperature;
        Self {
            client,
            model: model.into(),
            prompt,
            temperature,
            request_timeout,
        }
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &PromptDefinition {
        &self.prompt
    }

    /// Answer `question` from `context`, returning the completion text verbatim.
    pub async fn generate(&self, question: &str, context: &str) -> AppResult<String> {
        let built = build_grounded_prompt(&self.prompt, question, context)?;

        tracing::debug!(
            provider = self.client.provider_name(),
            model = %self.model,
            context_chars = built.metadata.context_chars,
            "Generating grounded answer"
        );

        let request = LlmRequest::new(built.user, self.model.clone())
            .with_system(built.system)
            .with_temperature(self.temperature);

        let response = with_deadline(
            "completion request",
            self.request_timeout,
            self.client.complete(&request),
        )
        .await?;

        tracing::debug!(
            completion_tokens = response.usage.completion_tokens,
            "Completion received"
        );

        Ok(response.content)
    }
}

impl std::fmt::Debug for AnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerGenerator")
            .field("provider", &self.client.provider_name())
            .field("model", &self.model)
            .field("prompt", &self.prompt.id)
            .field("temperature", &self.temperature)
            .finish()
    }
}
