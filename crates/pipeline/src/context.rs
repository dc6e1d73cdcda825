//! State carried through one pipeline run.

use crate::stage::StageKind;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Raw output of a completed stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutput {
    pub stage: StageKind,
    pub content: String,
}

/// Inputs of a run plus every completed stage's output, in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct StageContext {
    pub query: String,

    /// Retrieved passages, already formatted with their sources
    pub context: String,

    /// Headline used by the newsroom stages; defaults to the query
    pub title: String,

    /// Run date, supplied by the caller
    pub date: NaiveDate,

    outputs: Vec<StageOutput>,
}

impl StageContext {
    pub fn new(query: impl Into<String>, context: impl Into<String>, date: NaiveDate) -> Self {
        let query = query.into();
        Self {
            title: query.clone(),
            query,
            context: context.into(),
            date,
            outputs: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn outputs(&self) -> &[StageOutput] {
        &self.outputs
    }

    /// Output of a completed stage.
    pub fn output(&self, kind: StageKind) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.stage == kind)
            .map(|o| o.content.as_str())
    }

    pub fn last_output(&self) -> Option<&StageOutput> {
        self.outputs.last()
    }

    pub(crate) fn record(&mut self, stage: StageKind, content: String) {
        self.outputs.push(StageOutput { stage, content });
    }

    /// Variables available to task templates.
    pub fn template_variables(&self) -> HashMap<String, String> {
        HashMap::from([
            ("query".to_string(), self.query.clone()),
            ("context".to_string(), self.context.clone()),
            ("title".to_string(), self.title.clone()),
            ("date".to_string(), self.date.format("%Y-%m-%d").to_string()),
        ])
    }
}
