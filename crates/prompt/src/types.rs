//! Prompt types for newsdesk stages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stage prompt: behavioural role plus a task template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptDefinition {
    /// Prompt identifier, equal to the stage name (e.g. "fact_checker")
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,

    /// Role description sent as the system message
    pub role: String,

    /// Task template with Handlebars syntax
    pub template: String,

    /// Output specification
    #[serde(default)]
    pub output: PromptOutputSpec,
}

fn default_api_version() -> String {
    "1.0".to_string()
}

/// Output specification for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptOutputSpec {
    /// Expected output format ("markdown", "json", "text")
    pub format: String,
}

impl Default for PromptOutputSpec {
    fn default() -> Self {
        Self {
            format: "markdown".to_string(),
        }
    }
}

/// Where a resolved prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptOrigin {
    /// Compiled into the binary
    Builtin,
    /// Loaded from the workspace prompts directory
    Workspace,
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (the stage role)
    pub system: String,

    /// Rendered task
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Builtin or workspace override
    pub origin: PromptOrigin,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(
        system: String,
        user: String,
        source_prompt_id: String,
        origin: PromptOrigin,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id,
                origin,
                resolved_variables,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: editor
title: Senior Content Editor
role: "You are an award-winning editor."
template: "Rewrite for {{query}}"
output:
  format: markdown
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "editor");
        assert_eq!(def.api_version, "1.0");
        assert_eq!(def.output.format, "markdown");
    }

    #[test]
    fn test_output_defaults_to_markdown() {
        let yaml = "id: a\ntitle: A\nrole: r\ntemplate: t\n";
        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.output, PromptOutputSpec::default());
    }

    #[test]
    fn test_built_prompt_creation() {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), "test".to_string());

        let built = BuiltPrompt::new(
            "System message".to_string(),
            "User message".to_string(),
            "researcher".to_string(),
            PromptOrigin::Builtin,
            vars,
        );

        assert_eq!(built.system, "System message");
        assert_eq!(built.metadata.source_prompt_id, "researcher");
        assert_eq!(built.metadata.origin, PromptOrigin::Builtin);
    }
}
