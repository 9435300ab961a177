//! Prompt types for DocBrain.
//!
//! This module defines the domain entities for the prompt system.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Behavioral settings
    #[serde(default)]
    pub behavior: PromptBehavior,

    /// System instruction template with Handlebars syntax.
    ///
    /// Available variables: `context`, `question`, `refusal`.
    pub template: String,

    /// Output specification
    pub output: PromptOutputSpec,
}

/// Behavioral settings for prompt execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptBehavior {
    /// Sampling temperature passed to the completion service
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Sentence the model must use when the context lacks the answer
    #[serde(default = "default_refusal")]
    pub refusal: String,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_refusal() -> String {
    crate::defaults::REFUSAL_SENTENCE.to_string()
}

impl Default for PromptBehavior {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            refusal: default_refusal(),
        }
    }
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// Output format (e.g., "plain", "markdown")
    pub format: String,
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered system instruction
    pub system: String,

    /// User turn, the raw question
    pub user: String,

    /// Sampling temperature from the definition
    pub temperature: f32,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Length of the injected context in characters
    #[serde(rename = "contextChars")]
    pub context_chars: usize,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: grounded-answer
title: Strict Answers
apiVersion: "1.0"
createdBy: ops
behavior:
  temperature: 0.0
template: "Only use this: {{context}}"
output:
  format: plain
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "grounded-answer");
        assert_eq!(def.behavior.temperature, 0.0);
        // Missing refusal falls back to the canonical sentence
        assert_eq!(def.behavior.refusal, crate::defaults::REFUSAL_SENTENCE);
    }
}
