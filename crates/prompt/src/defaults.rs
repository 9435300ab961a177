//! Built-in grounded-answer prompt.

use crate::types::{PromptBehavior, PromptDefinition, PromptOutputSpec};

/// Identifier of the grounded-answer prompt, also its override file stem.
pub const GROUNDED_ANSWER_ID: &str = "grounded-answer";

/// Sentence the assistant uses when the documents do not hold the answer.
pub const REFUSAL_SENTENCE: &str =
    "I don't have enough information in the uploaded documents to answer this question.";

const GROUNDED_ANSWER_TEMPLATE: &str = r#"You are DocBrain, a document analysis assistant. You help users understand and extract information from the documents they uploaded.

INSTRUCTIONS:
1. Answer ONLY from the context below, which comes from the user's documents
2. Be precise and quote numbers, dates and other specific facts exactly as they appear
3. ALWAYS name the document each piece of information comes from
4. When several passages are relevant, combine them into one coherent answer
5. If the answer is not in the context, reply exactly: "{{refusal}}"

FORMATTING:
- PLAIN TEXT only, never markdown, asterisks or hashtags
- Use simple dashes (-) for lists
- Use CAPITAL LETTERS for emphasis
- Keep paragraphs short with blank lines between them

CITATIONS:
- Say where each fact was found, e.g. "According to contract.pdf..."
- Cite every source you use
- Example: "The salary is $100,000 per year (Source: contract.pdf)"

CONTEXT FROM DOCUMENTS:
----------------
{{context}}
----------------

Your answer must be grounded in the context above. Always cite where you found the information."#;

/// The grounded-answer prompt used when no override file exists.
pub fn grounded_answer() -> PromptDefinition {
    PromptDefinition {
        id: GROUNDED_ANSWER_ID.to_string(),
        title: "DocBrain grounded answer".to_string(),
        api_version: "1.0".to_string(),
        created_by: "docbrain".to_string(),
        behavior: PromptBehavior::default(),
        template: GROUNDED_ANSWER_TEMPLATE.to_string(),
        output: PromptOutputSpec {
            format: "plain".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_mentions_refusal_and_context() {
        let def = grounded_answer();
        assert!(def.template.contains("{{refusal}}"));
        assert!(def.template.contains("----------------\n{{context}}\n----------------"));
        assert_eq!(def.behavior.temperature, 0.1);
    }
}
