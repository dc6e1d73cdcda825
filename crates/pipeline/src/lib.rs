//! Sequential stage pipeline for newsdesk.
//!
//! - Closed set of stage kinds and their wiring (`stage`)
//! - Run state and accumulated outputs (`context`, `runner`)
//! - Structured extraction with fallbacks (`extract`)
//! - Brief and post templating (`formatter`)
//! - Preset assembly and artifact writing (`preset`, `artifacts`)

pub mod artifacts;
pub mod context;
pub mod extract;
pub mod formatter;
pub mod preset;
pub mod runner;
pub mod stage;

#[cfg(test)]
mod tests;

pub use artifacts::save_artifacts;
pub use context::{StageContext, StageOutput};
pub use extract::{Extracted, Illustration, Published};
pub use preset::{Artifacts, Preset, RunReport};
pub use runner::{Pipeline, PipelineRun, PipelineState};
pub use stage::{StageKind, StageSpec};
