//! Ingest command handler.
//!
//! Extracts text from files and adds it to the index, one document per file.

use clap::Args;
use docbrain_core::{config::AppConfig, AppError, AppResult};
use docbrain_knowledge::{collect_files, FileExtractor, Pipeline, TextExtractor};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

/// Add documents to the index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// File extensions to pick up when walking directories (e.g. md, txt)
    #[arg(long)]
    pub include: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestReport {
    ingested: Vec<IngestedFile>,
    skipped: Vec<SkippedFile>,
    total_chunks: usize,
    duration_secs: f64,
}

#[derive(Debug, Serialize)]
struct IngestedFile {
    source: String,
    chunks: usize,
}

#[derive(Debug, Serialize)]
struct SkippedFile {
    path: PathBuf,
    reason: String,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        let start = Instant::now();

        let files = collect_files(&self.paths, &self.include)?;
        if files.is_empty() {
            tracing::warn!("No matching files under {:?}", self.paths);
        }

        let pipeline = Pipeline::from_config(config).await?;
        let extractor = FileExtractor;

        let mut report = IngestReport {
            ingested: Vec::new(),
            skipped: Vec::new(),
            total_chunks: 0,
            duration_secs: 0.0,
        };

        for path in files {
            // Unreadable documents are skipped; model and storage failures abort
            let document = match extractor.extract(&path) {
                Ok(document) => document,
                Err(e @ AppError::InvalidInput(_)) | Err(e @ AppError::Io(_)) => {
                    tracing::warn!("Skipping {:?}: {}", path, e);
                    report.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let chunks = pipeline.ingest_document(&document).await?;
            report.total_chunks += chunks;
            report.ingested.push(IngestedFile {
                source: document.source_name,
                chunks,
            });
        }

        report.duration_secs = start.elapsed().as_secs_f64();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            for file in &report.ingested {
                println!("Ingested {} ({} chunks)", file.source, file.chunks);
            }
            for file in &report.skipped {
                println!("Skipped {}: {}", file.path.display(), file.reason);
            }
            println!(
                "Indexed {} chunks from {} files in {:.2}s",
                report.total_chunks,
                report.ingested.len(),
                report.duration_secs
            );
        }

        Ok(())
    }
}
