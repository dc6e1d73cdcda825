//! Stage prompts for newsdesk.
//!
//! - Built-in role and task definitions for every stage
//! - YAML overrides under `.newsdesk/prompts/<stage>.yml`
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, render_template};
pub use builtin::{builtin_ids, builtin_prompt};
pub use loader::{list_prompts, load_prompt, resolve_prompt};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOrigin, PromptOutputSpec,
};
