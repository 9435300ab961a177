//! Prompt loader for YAML prompt definitions.
//!
//! Definitions live in `<data_dir>/prompts/<id>.yml`. A missing file is not an
//! error for the grounded-answer prompt; the built-in definition is used.

use crate::defaults::{self, GROUNDED_ANSWER_ID};
use crate::types::PromptDefinition;
use docbrain_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID from the prompts directory.
///
/// # Arguments
/// * `prompts_dir` - Directory holding `<id>.yml` files
/// * `prompt_id` - Prompt identifier (e.g., "grounded-answer")
///
/// # Example
/// ```no_run
/// use docbrain_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new(".docbrain/prompts"), "grounded-answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir.join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load the grounded-answer prompt, preferring an override on disk.
pub fn load_grounded_answer(prompts_dir: &Path) -> AppResult<PromptDefinition> {
    if prompts_dir.join(format!("{}.yml", GROUNDED_ANSWER_ID)).exists() {
        load_prompt(prompts_dir, GROUNDED_ANSWER_ID)
    } else {
        tracing::debug!("No prompt override found, using built-in grounded answer");
        Ok(defaults::grounded_answer())
    }
}

/// List all prompt IDs available in the prompts directory.
pub fn list_prompts(prompts_dir: &Path) -> AppResult<Vec<String>> {
    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    // A grounded prompt that never sees the context cannot ground anything
    if def.id == GROUNDED_ANSWER_ID && !def.template.contains("{{context}}") {
        return Err(AppError::Prompt(
            "Grounded answer template must reference {{context}}".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&def.behavior.temperature) {
        return Err(AppError::Prompt(format!(
            "Temperature {} outside 0.0-2.0",
            def.behavior.temperature
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, template: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let content = format!(
            r#"
id: {}
title: "Custom"
apiVersion: "1.0"
behavior:
  temperature: 0.2
template: "{}"
output:
  format: plain
"#,
            id, template
        );

        let file_path = dir.join(format!("{}.yml", id));
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "grounded-answer", "Context: {{context}}");

        let prompt = load_prompt(temp_dir.path(), "grounded-answer").unwrap();
        assert_eq!(prompt.title, "Custom");
        assert_eq!(prompt.behavior.temperature, 0.2);
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_prompt(temp_dir.path(), "nonexistent");
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("broken.yml"), "invalid: yaml: content:").unwrap();

        let result = load_prompt(temp_dir.path(), "broken");
        assert!(result.is_err());
    }

    #[test]
    fn test_grounded_override_requires_context() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "grounded-answer", "Just answer freely");

        assert!(load_grounded_answer(temp_dir.path()).is_err());
    }

    #[test]
    fn test_grounded_answer_falls_back_to_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_grounded_answer(&temp_dir.path().join("prompts")).unwrap();
        assert_eq!(prompt.id, GROUNDED_ANSWER_ID);
        assert_eq!(prompt.created_by, "docbrain");
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "prompt2", "{{context}}");
        write_prompt(temp_dir.path(), "prompt1", "{{context}}");

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts, vec!["prompt1".to_string(), "prompt2".to_string()]);
    }
}
