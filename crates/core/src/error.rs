//! Error types for newsdesk.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! generation, corpus, prompt and pipeline failures.

use thiserror::Error;

/// Unified error type for newsdesk.
///
/// Malformed stage output is deliberately absent here: the pipeline recovers
/// from it locally and never surfaces it as an error.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation function (LLM provider) errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Corpus store, embedding and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// A precondition the user must fix before retrying (e.g. empty corpus)
    #[error("{0}")]
    Precondition(String),

    /// Query against a collection that was never ingested
    #[error("Collection '{0}' not found. Run ingestion first.")]
    CollectionNotFound(String),

    /// Collection was built with a different embedding function
    #[error("Collection '{collection}' was embedded with '{recorded}', but the active embedding is '{active}'. Re-run ingestion.")]
    EmbeddingMismatch {
        collection: String,
        recorded: String,
        active: String,
    },

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Stage name outside the known set
    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    /// Invalid pipeline wiring
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// A stage's generation call failed; the run stops here
    #[error("Stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_not_found_message() {
        let err = AppError::CollectionNotFound("knowledge_base".to_string());
        let msg = err.to_string();
        assert!(msg.contains("knowledge_base"));
        assert!(msg.contains("Run ingestion first"));
    }

    #[test]
    fn test_stage_failed_message() {
        let err = AppError::StageFailed {
            stage: "editor".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Stage 'editor' failed: connection refused");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
