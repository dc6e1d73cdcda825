//! Stage kinds and their wiring.

use newsdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every stage the pipeline knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Researcher,
    FactChecker,
    Editor,
    Publisher,
    Planner,
    Summarizer,
    Illustrator,
    NewsPublisher,
}

impl StageKind {
    pub const ALL: [StageKind; 8] = [
        StageKind::Researcher,
        StageKind::FactChecker,
        StageKind::Editor,
        StageKind::Publisher,
        StageKind::Planner,
        StageKind::Summarizer,
        StageKind::Illustrator,
        StageKind::NewsPublisher,
    ];

    /// Parse a stage name such as `fact_checker` or `news-publisher`.
    pub fn from_name(name: &str) -> AppResult<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| AppError::UnknownStage(name.to_string()))
    }

    /// Stable name, also the prompt id.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Researcher => "researcher",
            Self::FactChecker => "fact_checker",
            Self::Editor => "editor",
            Self::Publisher => "publisher",
            Self::Planner => "planner",
            Self::Summarizer => "summarizer",
            Self::Illustrator => "illustrator",
            Self::NewsPublisher => "news_publisher",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Researcher => "Researcher",
            Self::FactChecker => "Fact Checker",
            Self::Editor => "Editor",
            Self::Publisher => "Publisher",
            Self::Planner => "Planner",
            Self::Summarizer => "Summarizer",
            Self::Illustrator => "Illustrator",
            Self::NewsPublisher => "News Publisher",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A stage plus the upstream stages whose output it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub kind: StageKind,
    pub reads: Vec<StageKind>,
}

impl StageSpec {
    /// A stage that sees no upstream output.
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            reads: Vec::new(),
        }
    }

    /// Wire upstream outputs into this stage.
    pub fn reading(mut self, upstream: impl IntoIterator<Item = StageKind>) -> Self {
        self.reads.extend(upstream);
        self
    }
}
