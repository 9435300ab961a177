//! In-memory vector store with exact cosine search.
//!
//! The store is append-only: entries are never mutated or removed except to
//! roll back a batch whose persistence failed.

use crate::types::{IndexEntry, SearchHit, SourceStats};
use docbrain_core::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    dimension: Option<usize>,
    entries: Vec<IndexEntry>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted entries, in insertion order.
    pub(crate) fn from_parts(dimension: Option<usize>, entries: Vec<IndexEntry>) -> Self {
        Self { dimension, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimension shared by every vector, fixed by the first insert.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Append a batch.
    ///
    /// The whole batch is rejected, leaving the store untouched, if any
    /// vector disagrees with the store's dimension or with the batch itself.
    pub fn insert(&mut self, batch: Vec<IndexEntry>) -> AppResult<()> {
        let Some(first) = batch.first() else {
            return Ok(());
        };

        let dimension = self.dimension.unwrap_or(first.embedding.len());
        if dimension == 0 {
            return Err(AppError::InvalidInput(
                "Embeddings must have at least one dimension".to_string(),
            ));
        }

        if let Some(bad) = batch.iter().find(|e| e.embedding.len() != dimension) {
            return Err(AppError::InvalidInput(format!(
                "Embedding dimension {} does not match index dimension {}",
                bad.embedding.len(),
                dimension
            )));
        }

        self.dimension = Some(dimension);
        self.entries.extend(batch);
        Ok(())
    }

    /// Undo appends back to `len` entries, restoring the prior dimension.
    pub(crate) fn rollback(&mut self, len: usize, dimension: Option<usize>) {
        self.entries.truncate(len);
        self.dimension = dimension;
    }

    /// Top `k` entries by descending cosine similarity.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<SearchHit>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if let Some(dimension) = self.dimension {
            if query.len() != dimension {
                return Err(AppError::Config(format!(
                    "Query dimension {} does not match index dimension {}",
                    query.len(),
                    dimension
                )));
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        // sort_by is stable, so ties stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        tracing::debug!(
            "Retrieved {} entries (requested top-{})",
            scored.len(),
            k
        );

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                score: Some(score),
            })
            .collect())
    }

    /// Distinct sources with their chunk counts, in first-ingestion order.
    pub fn sources(&self) -> Vec<SourceStats> {
        let mut stats: Vec<SourceStats> = Vec::new();
        for entry in &self.entries {
            match stats.iter_mut().find(|s| s.source == entry.chunk.source) {
                Some(existing) => existing.chunks += 1,
                None => stats.push(SourceStats {
                    source: entry.chunk.source.clone(),
                    chunks: 1,
                }),
            }
        }
        stats
    }
}

/// Calculate cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot_product / (norm_a * norm_b);
    // Degenerate vectors score like zero vectors
    if similarity.is_nan() {
        0.0
    } else {
        similarity
    }
}
