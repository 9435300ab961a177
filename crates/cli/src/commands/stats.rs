//! Stats command handler.
//!
//! Reports what the index holds without contacting any model service.

use clap::Args;
use docbrain_core::{config::AppConfig, AppResult};
use docbrain_knowledge::{index, IndexStats};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index_dir = config.vectors_dir();
        let store = index::load(index_dir.clone()).await?;
        let stats = IndexStats::of(store.as_ref());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Index: {}", index_dir.display());
            println!("  State: {}", stats.state.as_str());
            println!("  Chunks: {}", stats.entries);
            if let Some(dimension) = stats.dimension {
                println!("  Dimension: {}", dimension);
            }
            if !stats.sources.is_empty() {
                println!("  Sources:");
                for source in &stats.sources {
                    println!("  - {} ({} chunks)", source.source, source.chunks);
                }
            }
        }

        Ok(())
    }
}
