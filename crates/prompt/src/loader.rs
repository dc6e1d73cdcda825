//! Prompt loader: workspace YAML overrides on top of the built-ins.

use crate::builtin::{builtin_ids, builtin_prompt};
use crate::types::{PromptDefinition, PromptOrigin};
use newsdesk_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID from a prompts directory.
///
/// Looks for `<id>.yml` in `prompts_dir` (normally `.newsdesk/prompts/`).
///
/// # Example
/// ```no_run
/// use newsdesk_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new(".newsdesk/prompts"), "editor")?;
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

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file {:?} declares id '{}', expected '{}'",
            prompt_file, definition.id, prompt_id
        )));
    }

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Resolve a stage prompt: workspace override first, then the built-in.
pub fn resolve_prompt(
    prompts_dir: &Path,
    prompt_id: &str,
) -> AppResult<(PromptDefinition, PromptOrigin)> {
    if prompts_dir.join(format!("{}.yml", prompt_id)).exists() {
        return Ok((load_prompt(prompts_dir, prompt_id)?, PromptOrigin::Workspace));
    }

    builtin_prompt(prompt_id)
        .map(|def| (def, PromptOrigin::Builtin))
        .ok_or_else(|| AppError::Prompt(format!("No prompt defined for '{}'", prompt_id)))
}

/// List every available prompt ID with its origin, sorted by ID.
pub fn list_prompts(prompts_dir: &Path) -> AppResult<Vec<(String, PromptOrigin)>> {
    let mut overrides = Vec::new();

    if prompts_dir.exists() {
        for entry in walkdir::WalkDir::new(prompts_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    overrides.push(stem.to_string());
                }
            }
        }
    }

    let mut prompts: Vec<(String, PromptOrigin)> = builtin_ids()
        .into_iter()
        .filter(|id| !overrides.iter().any(|o| o == id))
        .map(|id| (id.to_string(), PromptOrigin::Builtin))
        .collect();
    prompts.extend(
        overrides
            .into_iter()
            .map(|id| (id, PromptOrigin::Workspace)),
    );
    prompts.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(prompts)
}

fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.role.trim().is_empty() {
        return Err(AppError::Prompt("Prompt role cannot be empty".to_string()));
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

    Ok(())
}
