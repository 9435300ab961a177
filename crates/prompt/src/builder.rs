//! Prompt builder for rendering templates and injecting retrieved context.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use docbrain_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build the grounded prompt for one question.
///
/// The template renders into the system instruction with the retrieved
/// context embedded; the raw question becomes the user turn unchanged.
///
/// # Example
/// ```no_run
/// use docbrain_prompt::{build_grounded_prompt, defaults};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = defaults::grounded_answer();
/// let built = build_grounded_prompt(
///     &def,
///     "What is the salary?",
///     "[Source: contract.pdf]\nThe salary is $100,000 per year.",
/// )?;
/// println!("System prompt: {}", built.system);
/// # Ok(())
/// # }
/// ```
pub fn build_grounded_prompt(
    definition: &PromptDefinition,
    question: &str,
    context: &str,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());
    variables.insert("question".to_string(), question.to_string());
    variables.insert("refusal".to_string(), definition.behavior.refusal.clone());

    let system = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt {
        system,
        user: question.to_string(),
        temperature: definition.behavior.temperature,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            context_chars: context.chars().count(),
            resolved_variables: variables,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output, HTML escaping would corrupt document content
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
