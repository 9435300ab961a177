//! Document knowledge base for DocBrain.
//!
//! Chunks ingested text, embeds it, keeps the vectors in a persistent store
//! and answers questions from the closest chunks through a grounded prompt.
//!
//! # Example
//! ```no_run
//! use docbrain_core::AppConfig;
//! use docbrain_knowledge::Pipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let pipeline = Pipeline::from_config(&config).await?;
//!
//! pipeline
//!     .ingest("The salary is $100,000 per year.", "contract.pdf")
//!     .await?;
//! println!("{}", pipeline.ask("What is the salary?").await?);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod deadline;
pub mod embeddings;
pub mod extract;
pub mod generator;
pub mod index;
pub mod pipeline;
pub mod retriever;
pub mod types;
pub mod vector_index;

// Re-export commonly used types
pub use chunker::Chunker;
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider, MockProvider};
pub use extract::{collect_files, FileExtractor, TextExtractor};
pub use generator::AnswerGenerator;
pub use pipeline::{Pipeline, PipelineParts};
pub use retriever::{
    Retriever, MAX_QUESTION_CHARS, MIN_CONTEXT_CHARS, MIN_QUESTION_CHARS,
    MIN_RELEVANCE_THRESHOLD, TOP_K,
};
pub use types::{
    Answer, Chunk, Document, Guidance, IndexEntry, IndexState, IndexStats, Retrieval, SearchHit,
    SourceStats,
};
pub use vector_index::VectorStore;
