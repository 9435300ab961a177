//! Ask command handler.
//!
//! Answers a question from the indexed documents.

use clap::Args;
use docbrain_core::{config::AppConfig, AppResult};
use docbrain_knowledge::{Answer, Pipeline};

/// Ask a question about the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Question: {}", self.question);

        let pipeline = Pipeline::from_config(config).await?;
        let answer = pipeline.answer(&self.question).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
            return Ok(());
        }

        println!("{}", answer.text());

        if let Answer::Generated { sources, .. } = &answer {
            if !sources.is_empty() {
                println!();
                println!("Sources:");
                for source in sources {
                    println!("- {}", source);
                }
            }
        }

        Ok(())
    }
}
