//! Command handlers for the newsdesk CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ingest;
pub mod prompts;
pub mod query;
pub mod stats;

// Re-export command types for convenience
pub use ingest::IngestCommand;
pub use prompts::PromptsCommand;
pub use query::QueryCommand;
pub use stats::StatsCommand;
