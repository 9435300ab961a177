//! Prompt system for DocBrain.
//!
//! This crate provides structured prompt management with:
//! - A built-in grounded-answer prompt
//! - YAML-based prompt overrides
//! - Handlebars template rendering with retrieved context

pub mod builder;
pub mod defaults;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_grounded_prompt;
pub use defaults::{GROUNDED_ANSWER_ID, REFUSAL_SENTENCE};
pub use loader::{list_prompts, load_grounded_answer, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptOutputSpec};
