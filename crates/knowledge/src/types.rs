//! Knowledge system type definitions.

use crate::vector_index::VectorStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A document handed to ingestion.
///
/// Only its chunks are persisted; the document itself is transient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier (UUID v4)
    pub id: String,

    /// Display name used for citations (e.g. "contract.pdf")
    pub source_name: String,

    /// Extracted plain text
    pub raw_text: String,
}

impl Document {
    /// Create a document with a fresh identifier.
    pub fn new(raw_text: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_name: source_name.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// A contiguous slice of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content, verbatim from the source
    pub text: String,

    /// Source document name
    pub source: String,

    /// Position within the source, starting at 0
    pub sequence_index: usize,

    /// Offset of the first character within the source text, in characters
    pub char_start: usize,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Offset one past the last character within the source text.
    pub fn char_end(&self) -> usize {
        self.char_start + self.char_len()
    }
}

/// A chunk paired with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub embedding: Vec<f32>,
    pub chunk: Chunk,
    pub ingested_at: DateTime<Utc>,
}

impl IndexEntry {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            chunk,
            ingested_at: Utc::now(),
        }
    }
}

/// One similarity search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: Chunk,

    /// Cosine similarity, absent for backends that do not expose scores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

/// Startup state of the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    /// Nothing on disk yet (fresh install)
    Uninitialized,
    /// Index directory exists but holds no entries
    Empty,
    /// At least one entry is indexed
    Populated,
}

impl IndexState {
    /// Classify a loaded store; `None` means nothing exists on disk yet.
    pub fn of(store: Option<&VectorStore>) -> Self {
        match store {
            None => Self::Uninitialized,
            Some(store) if store.is_empty() => Self::Empty,
            Some(_) => Self::Populated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Empty => "empty",
            Self::Populated => "populated",
        }
    }
}

/// Chunk count for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    pub source: String,
    pub chunks: usize,
}

/// Snapshot of the index for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub state: IndexState,
    pub entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    pub sources: Vec<SourceStats>,
}

impl IndexStats {
    pub fn of(store: Option<&VectorStore>) -> Self {
        Self {
            state: IndexState::of(store),
            entries: store.map_or(0, VectorStore::len),
            dimension: store.and_then(VectorStore::dimension),
            sources: store.map(VectorStore::sources).unwrap_or_default(),
        }
    }
}

/// Ordinary no-answer outcomes, reported to the user as plain sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guidance {
    TooShort,
    TooLong,
    NoDocuments,
    NoResults,
    NoRelevantResults,
    ContextTooBrief,
}

impl Guidance {
    /// The sentence shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            Self::TooShort => "Please provide a more detailed question.",
            Self::TooLong => "Your question is too long. Please keep it under 500 characters.",
            Self::NoDocuments => "No documents have been indexed yet. Please upload a PDF first.",
            Self::NoResults => {
                "I couldn't find any relevant information in your documents to answer this question."
            }
            Self::NoRelevantResults => {
                "I couldn't find sufficiently relevant information in your documents to answer this question. Try rephrasing or asking about content that's actually in your uploaded files."
            }
            Self::ContextTooBrief => {
                "The retrieved context is too brief to provide a meaningful answer. Please try a different question or upload more detailed documents."
            }
        }
    }
}

impl fmt::Display for Guidance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of retrieval: either guidance or context ready for generation.
#[derive(Debug, Clone)]
pub enum Retrieval {
    Guidance(Guidance),
    Context {
        /// Source-headed context blocks joined by blank lines
        context: String,
        /// Surviving hits in ranked order
        hits: Vec<SearchHit>,
    },
}

/// Outcome of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    Guidance { reason: Guidance, text: String },
    Generated { text: String, sources: Vec<String> },
}

impl Answer {
    pub fn guidance(reason: Guidance) -> Self {
        Self::Guidance {
            reason,
            text: reason.message().to_string(),
        }
    }

    /// Text shown to the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Guidance { text, .. } | Self::Generated { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Guidance { text, .. } | Self::Generated { text, .. } => text,
        }
    }
}
