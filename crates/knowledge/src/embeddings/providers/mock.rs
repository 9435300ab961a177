//! Offline embedding provider built from character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use docbrain_core::AppResult;
use std::collections::{HashMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "per",
];

/// Deterministic, network-free provider for tests and offline runs.
///
/// Vectors are content-dependent (shared words and trigrams raise cosine
/// similarity) and unit-normalised, but carry no real semantics.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    /// Create a new mock provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];
        let lower = text.to_lowercase();
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !stop_words.contains(w))
        {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let idx = hash_str(&window.iter().collect::<String>(), 37) % self.dimensions;
                embedding[idx] += (*freq as f32).sqrt();
            }

            let idx = hash_str(word, 31) % self.dimensions;
            embedding[idx] += *freq as f32;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

fn hash_str(s: &str, multiplier: u64) -> usize {
    s.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(b as u64)) as usize
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_mock_provider_embed_batch() {
        let provider = MockProvider::new(384);
        let texts = vec![
            "hello world".to_string(),
            "test embedding".to_string(),
            "rust programming".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 384);
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 0.001);
        }
    }

    #[tokio::test]
    async fn test_mock_provider_deterministic() {
        let provider = MockProvider::new(384);
        let embedding1 = provider.embed_query("deterministic test").await.unwrap();
        let embedding2 = provider.embed_query("deterministic test").await.unwrap();
        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_shared_words_score_higher() {
        let provider = MockProvider::new(384);
        let query = provider.embed_query("employee salary").await.unwrap();
        let related = provider.embed_query("the salary of the employee").await.unwrap();
        let unrelated = provider.embed_query("cooking pasta recipes").await.unwrap();

        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[tokio::test]
    async fn test_mock_provider_empty_text() {
        let provider = MockProvider::new(384);
        let embedding = provider.embed_query("").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_mock_provider_utf8_safety() {
        let provider = MockProvider::new(384);
        let text = "Gamedex é um aplicativo 🎮 brasileiro para gerenciar jogos!";
        let embedding = provider.embed_query(text).await.unwrap();

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }
}
