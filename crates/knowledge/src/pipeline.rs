//! The ingest/ask pipeline.
//!
//! A [`Pipeline`] owns the chunker, the embedding and completion clients and
//! the in-memory vector store, and mirrors every accepted ingestion to disk
//! before returning.

use crate::chunker::Chunker;
use crate::deadline::with_deadline;
use crate::embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
use crate::generator::AnswerGenerator;
use crate::index;
use crate::retriever::Retriever;
use crate::types::{Answer, Document, IndexEntry, IndexState, IndexStats, Retrieval};
use crate::vector_index::VectorStore;
use docbrain_core::{AppConfig, AppError, AppResult};
use docbrain_llm::create_client;
use docbrain_prompt::load_grounded_answer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Everything a pipeline is assembled from.
pub struct PipelineParts {
    pub chunker: Chunker,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: AnswerGenerator,
    /// Directory holding the persisted index
    pub index_dir: PathBuf,
    /// Time budget for each upstream embedding request
    pub request_timeout: Duration,
}

/// Retrieval-augmented question answering over ingested documents.
///
/// Ingestion holds the store's write lock for its whole insert and save;
/// questions hold the read lock only while retrieving.
#[derive(Debug)]
pub struct Pipeline {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    generator: AnswerGenerator,
    index_dir: PathBuf,
    request_timeout: Duration,
    store: RwLock<Option<VectorStore>>,
}

impl Pipeline {
    /// Assemble a pipeline and load any index already at `parts.index_dir`.
    ///
    /// An index built with a different embedding dimension is a
    /// configuration error.
    pub async fn open(parts: PipelineParts) -> AppResult<Self> {
        let PipelineParts {
            chunker,
            embedder,
            generator,
            index_dir,
            request_timeout,
        } = parts;

        let store = index::load(index_dir.clone()).await?;

        if let Some(dim) = store.as_ref().and_then(VectorStore::dimension) {
            if dim != embedder.dimensions() {
                return Err(AppError::Config(format!(
                    "Index at {} was built with {}-dimensional embeddings but {} produces {}; \
                     restore the original embedding settings or rebuild the index",
                    index_dir.display(),
                    dim,
                    embedder.provider_name(),
                    embedder.dimensions()
                )));
            }
        }

        tracing::info!(
            index_dir = %index_dir.display(),
            state = IndexState::of(store.as_ref()).as_str(),
            embedder = embedder.provider_name(),
            model = generator.model(),
            "Pipeline ready"
        );

        Ok(Self {
            retriever: Retriever::new(Arc::clone(&embedder), request_timeout),
            chunker,
            embedder,
            generator,
            index_dir,
            request_timeout,
            store: RwLock::new(store),
        })
    }

    /// Build every component from application configuration.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let api_key = config.resolve_api_key();
        let timeout = config.request_timeout();

        let embedder = create_provider(
            &EmbeddingConfig::from_settings(&config.embedding),
            api_key.as_deref(),
        )?;
        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            api_key.as_deref(),
        )?;
        let prompt = load_grounded_answer(&config.prompts_dir())?;
        let generator = AnswerGenerator::new(client, config.model.clone(), prompt, timeout)
            .with_temperature(config.temperature);

        Self::open(PipelineParts {
            chunker: Chunker::from_settings(&config.chunking)?,
            embedder,
            generator,
            index_dir: config.vectors_dir(),
            request_timeout: timeout,
        })
        .await
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Chunk, embed, index and persist `raw_text` under `source_name`.
    ///
    /// Returns the number of chunks added. Empty text is a no-op. On any
    /// failure after embedding, memory and disk keep their prior contents.
    pub async fn ingest(&self, raw_text: &str, source_name: &str) -> AppResult<usize> {
        let source = source_name.trim();
        if source.is_empty() {
            return Err(AppError::InvalidInput(
                "Source name must not be empty".to_string(),
            ));
        }

        let chunks = self.chunker.split(raw_text, source);
        if chunks.is_empty() {
            tracing::info!(source, "No text to ingest");
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_chunks(&texts).await?;

        if vectors.len() != chunks.len() {
            return Err(AppError::EmbeddingUnavailable(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }

        let batch: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding))
            .collect();
        let added = batch.len();

        let mut guard = self.store.write().await;
        let was_uninitialized = guard.is_none();
        let store = guard.get_or_insert_with(VectorStore::new);
        let prior_len = store.len();
        let prior_dimension = store.dimension();

        let saved = match store.insert(batch) {
            Ok(()) => {
                let new_entries = store.entries()[prior_len..].to_vec();
                match store.dimension() {
                    Some(dimension) => {
                        index::save(self.index_dir.clone(), dimension, prior_len, new_entries).await
                    }
                    None => Err(AppError::Storage(
                        "Index has no dimension after insert".to_string(),
                    )),
                }
            }
            Err(e) => Err(e),
        };

        if let Err(e) = saved {
            tracing::error!(source, error = %e, "Ingestion failed, rolling back");
            if was_uninitialized {
                *guard = None;
            } else if let Some(store) = guard.as_mut() {
                store.rollback(prior_len, prior_dimension);
            }
            return Err(e);
        }

        tracing::info!(
            source,
            chunks = added,
            total = prior_len + added,
            "Ingested document"
        );

        Ok(added)
    }

    /// Embed `texts` one upstream request at a time, each under its own deadline.
    async fn embed_chunks(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.embedder.batch_size().max(1)) {
            let embedded = with_deadline(
                "embedding request",
                self.request_timeout,
                self.embedder.embed_batch(batch),
            )
            .await?;
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    /// Ingest a [`Document`] under its source name.
    pub async fn ingest_document(&self, document: &Document) -> AppResult<usize> {
        tracing::debug!(id = %document.id, "Ingesting document");
        self.ingest(&document.raw_text, &document.source_name).await
    }

    /// Answer `question`, rendering guidance outcomes as their sentences.
    pub async fn ask(&self, question: &str) -> AppResult<String> {
        Ok(self.answer(question).await?.into_text())
    }

    /// Answer `question`, keeping guidance distinguishable from generated text.
    pub async fn answer(&self, question: &str) -> AppResult<Answer> {
        let retrieval = {
            let guard = self.store.read().await;
            self.retriever.retrieve(question, guard.as_ref()).await?
        };

        match retrieval {
            Retrieval::Guidance(reason) => {
                tracing::info!(?reason, "Answering with guidance");
                Ok(Answer::guidance(reason))
            }
            Retrieval::Context { context, hits } => {
                let text = self.generator.generate(question, &context).await?;

                let mut sources: Vec<String> = Vec::new();
                for hit in &hits {
                    if !sources.contains(&hit.chunk.source) {
                        sources.push(hit.chunk.source.clone());
                    }
                }

                Ok(Answer::Generated { text, sources })
            }
        }
    }

    pub async fn state(&self) -> IndexState {
        IndexState::of(self.store.read().await.as_ref())
    }

    /// Snapshot of the index for reporting.
    pub async fn stats(&self) -> IndexStats {
        IndexStats::of(self.store.read().await.as_ref())
    }
}
