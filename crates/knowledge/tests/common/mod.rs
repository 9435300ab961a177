//! Shared fakes for the pipeline integration tests.

#![allow(dead_code)]

use docbrain_core::{AppError, AppResult};
use docbrain_knowledge::{Chunker, EmbeddingProvider, Pipeline, PipelineParts};
use docbrain_knowledge::AnswerGenerator;
use docbrain_llm::{LlmRequest, MockLlmClient};
use docbrain_prompt::defaults;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Words the keyword embedder knows about, one dimension each.
pub const VOCABULARY: &[&str] = &[
    "salary", "employee", "engineer", "vacation", "weather", "rain", "rust", "compiler",
];

/// Embeds text as counts of vocabulary words, so scores are predictable.
///
/// Text without any vocabulary word lands on a final catch-all dimension.
#[derive(Debug, Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).collect();

        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|v| words.iter().filter(|w| *w == v).count() as f32)
            .collect();
        let other = if vector.iter().all(|x| *x == 0.0) { 1.0 } else { 0.0 };
        vector.push(other);
        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn provider_name(&self) -> &str {
        "keyword"
    }

    fn model_name(&self) -> &str {
        "keyword-v1"
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len() + 1
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Keyword embeddings that take `delay` per request and accept one text at a time.
#[derive(Debug)]
pub struct SlowEmbedder {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl SlowEmbedder {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for SlowEmbedder {
    fn provider_name(&self) -> &str {
        "slow"
    }

    fn model_name(&self) -> &str {
        "keyword-v1"
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len() + 1
    }

    fn batch_size(&self) -> usize {
        1
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(texts.iter().map(|t| KeywordEmbedder::vector(t)).collect())
    }
}

/// Never answers within any reasonable deadline.
#[derive(Debug)]
pub struct StalledEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for StalledEmbedder {
    fn provider_name(&self) -> &str {
        "stalled"
    }

    fn model_name(&self) -> &str {
        "stalled"
    }

    fn dimensions(&self) -> usize {
        VOCABULARY.len() + 1
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(AppError::EmbeddingUnavailable("unreachable".to_string()))
    }
}

/// Completion fake that reads only the context block of the system prompt.
///
/// It answers with the first context sentence sharing a word with the
/// question and cites the block's source header, or refuses.
pub fn citing_client() -> MockLlmClient {
    MockLlmClient::with_responder(|request: &LlmRequest| {
        let system = request.system.clone().unwrap_or_default();
        let context = system
            .split("----------------\n")
            .nth(1)
            .and_then(|rest| rest.split("\n----------------").next())
            .unwrap_or_default();

        let question_words: Vec<String> = request
            .prompt
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 3)
            .map(str::to_string)
            .collect();

        let mut source = "";
        for line in context.lines() {
            if let Some(name) = line.strip_prefix("[Source: ").and_then(|r| r.strip_suffix(']')) {
                source = name;
                continue;
            }
            for sentence in line.split_inclusive(". ") {
                let lower = sentence.to_lowercase();
                if question_words.iter().any(|w| lower.contains(w.as_str())) {
                    return Ok(format!("{} (Source: {})", sentence.trim(), source));
                }
            }
        }

        Ok(defaults::REFUSAL_SENTENCE.to_string())
    })
}

pub const CONTRACT: &str = "EMPLOYMENT CONTRACT\n\nThe employee will work at Acme Corp as a senior engineer. The salary is $100,000 per year. Benefits include health insurance and a pension plan.";

pub const FORECAST: &str = "Weekly forecast for the coast. Expect rain on Tuesday and Wednesday, with clearing skies and mild weather by the weekend.";

/// Open a pipeline over `index_dir` with the given fakes.
pub async fn open_pipeline(
    index_dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    client: MockLlmClient,
) -> Pipeline {
    open_with_chunker(index_dir, embedder, client, Chunker::default()).await
}

pub async fn open_with_chunker(
    index_dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    client: MockLlmClient,
    chunker: Chunker,
) -> Pipeline {
    try_open(index_dir, embedder, client, chunker).await.unwrap()
}

pub async fn try_open(
    index_dir: &Path,
    embedder: Arc<dyn EmbeddingProvider>,
    client: MockLlmClient,
    chunker: Chunker,
) -> AppResult<Pipeline> {
    let timeout = Duration::from_secs(30);
    let generator = AnswerGenerator::new(
        Arc::new(client),
        "test-model",
        defaults::grounded_answer(),
        timeout,
    );

    Pipeline::open(PipelineParts {
        chunker,
        embedder,
        generator,
        index_dir: index_dir.to_path_buf(),
        request_timeout: timeout,
    })
    .await
}
