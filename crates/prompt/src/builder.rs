//! Prompt builder: renders a stage's task template.

use crate::types::{BuiltPrompt, PromptDefinition, PromptOrigin};
use handlebars::Handlebars;
use newsdesk_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// The role becomes the system message and the rendered template the user
/// message.
///
/// # Example
/// ```no_run
/// use newsdesk_prompt::{build_prompt, builtin_prompt, PromptOrigin};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt("researcher").unwrap();
/// let mut vars = HashMap::new();
/// vars.insert("query".to_string(), "What is Rust?".to_string());
///
/// let built = build_prompt(&def, PromptOrigin::Builtin, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    origin: PromptOrigin,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        definition.role.clone(),
        user,
        definition.id.clone(),
        origin,
        variables,
    ))
}

/// Render a Handlebars template with variables, without HTML escaping.
pub fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
