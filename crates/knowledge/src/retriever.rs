//! Query validation, similarity search and context assembly.

use crate::deadline::with_deadline;
use crate::embeddings::EmbeddingProvider;
use crate::types::{Guidance, Retrieval, SearchHit};
use crate::vector_index::VectorStore;
use docbrain_core::AppResult;
use std::sync::Arc;
use std::time::Duration;

/// Questions shorter than this (after trimming) are rejected.
pub const MIN_QUESTION_CHARS: usize = 3;

/// Questions longer than this are rejected.
pub const MAX_QUESTION_CHARS: usize = 500;

/// Number of chunks requested from the index per question.
pub const TOP_K: usize = 4;

/// Hits scoring below this cosine similarity are dropped.
pub const MIN_RELEVANCE_THRESHOLD: f32 = 0.3;

/// Joined chunk text shorter than this (after trimming) is not worth answering from.
pub const MIN_CONTEXT_CHARS: usize = 50;

/// Turns a question into grounded context, or into guidance when it cannot.
#[derive(Debug, Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    request_timeout: Duration,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, request_timeout: Duration) -> Self {
        Self {
            embedder,
            request_timeout,
        }
    }

    /// Retrieve context for `question` from `store`.
    ///
    /// `store` is `None` when no index exists yet. Validation and the
    /// no-documents check happen before any embedding call.
    pub async fn retrieve(
        &self,
        question: &str,
        store: Option<&VectorStore>,
    ) -> AppResult<Retrieval> {
        if let Some(guidance) = validate_question(question) {
            tracing::debug!(?guidance, "Question rejected before retrieval");
            return Ok(Retrieval::Guidance(guidance));
        }

        let store = match store {
            Some(store) if !store.is_empty() => store,
            _ => return Ok(Retrieval::Guidance(Guidance::NoDocuments)),
        };

        let query = with_deadline(
            "embedding request",
            self.request_timeout,
            self.embedder.embed_query(question),
        )
        .await?;

        let hits = store.search(&query, TOP_K)?;
        if hits.is_empty() {
            return Ok(Retrieval::Guidance(Guidance::NoResults));
        }

        let scores: Vec<Option<f32>> = hits.iter().map(|h| h.score).collect();
        tracing::debug!("Retrieved {} hits before filtering - scores: {:?}", hits.len(), scores);

        let relevant = filter_relevant(hits);
        if relevant.is_empty() {
            tracing::info!(
                "No relevant chunks found (all scores below {:.2} threshold)",
                MIN_RELEVANCE_THRESHOLD
            );
            return Ok(Retrieval::Guidance(Guidance::NoRelevantResults));
        }

        if joined_text_chars(&relevant) < MIN_CONTEXT_CHARS {
            return Ok(Retrieval::Guidance(Guidance::ContextTooBrief));
        }

        tracing::info!("Retrieved {} relevant chunks", relevant.len());

        Ok(Retrieval::Context {
            context: build_context(&relevant),
            hits: relevant,
        })
    }
}

/// Length checks that precede any model call.
pub fn validate_question(question: &str) -> Option<Guidance> {
    if question.trim().chars().count() < MIN_QUESTION_CHARS {
        Some(Guidance::TooShort)
    } else if question.chars().count() > MAX_QUESTION_CHARS {
        Some(Guidance::TooLong)
    } else {
        None
    }
}

/// Drop hits with an explicit score below the threshold; unscored hits stay.
pub fn filter_relevant(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|hit| hit.score.map_or(true, |s| s >= MIN_RELEVANCE_THRESHOLD))
        .collect()
}

/// Trimmed character count of the chunk texts joined by blank lines.
fn joined_text_chars(hits: &[SearchHit]) -> usize {
    let joined = hits
        .iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    joined.trim().chars().count()
}

/// Source-headed context blocks in ranked order, separated by blank lines.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("[Source: {}]\n{}", hit.chunk.source, hit.chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
