//! Prompts command handler.
//!
//! Lists stage prompts, marking the ones overridden in the workspace.

use clap::Args;
use newsdesk_core::{config::AppConfig, AppResult};
use newsdesk_prompt::{list_prompts, resolve_prompt, PromptOrigin};

/// List stage prompts and where they come from
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Print the role and template of one stage
    #[arg(long)]
    pub show: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");
        let prompts_dir = config.prompts_dir();

        if let Some(id) = &self.show {
            let (definition, origin) = resolve_prompt(&prompts_dir, id)?;
            if self.json {
                let output = serde_json::json!({
                    "origin": origin,
                    "prompt": definition,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{} ({}, {})", definition.title, definition.id, origin_label(origin));
                println!("\nRole:\n{}", definition.role);
                println!("\nTemplate:\n{}", definition.template);
            }
            return Ok(());
        }

        let prompts = list_prompts(&prompts_dir)?;
        if self.json {
            let output: Vec<_> = prompts
                .iter()
                .map(|(id, origin)| serde_json::json!({ "id": id, "origin": origin }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for (id, origin) in &prompts {
                println!("{:<16} {}", id, origin_label(*origin));
            }
        }

        Ok(())
    }
}

fn origin_label(origin: PromptOrigin) -> &'static str {
    match origin {
        PromptOrigin::Builtin => "builtin",
        PromptOrigin::Workspace => "workspace override",
    }
}
