//! Embedding identity: which provider, model and dimension built a vector.

use newsdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an embedding function, rendered as `provider:model:dimensions`.
///
/// Vectors from different identities live in different spaces and must never
/// be compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingIdentity {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
}

impl EmbeddingIdentity {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            dimensions,
        }
    }

    /// Parse a `provider:model:dimensions` string.
    ///
    /// The model part may itself contain colons (e.g. `ollama:nomic-embed-text:latest:768`).
    pub fn parse(s: &str) -> AppResult<Self> {
        let (provider, rest) = s
            .split_once(':')
            .ok_or_else(|| AppError::Knowledge(format!("Invalid embedding identity: '{}'", s)))?;
        let (model, dims) = rest
            .rsplit_once(':')
            .ok_or_else(|| AppError::Knowledge(format!("Invalid embedding identity: '{}'", s)))?;
        let dimensions = dims.parse::<usize>().map_err(|_| {
            AppError::Knowledge(format!("Invalid dimensions in embedding identity: '{}'", s))
        })?;

        Ok(Self::new(provider, model, dimensions))
    }

    /// Validate that another identity is consistent with this one.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider {
            return Err(AppError::Knowledge(format!(
                "Provider mismatch: expected '{}', got '{}'",
                self.provider, other.provider
            )));
        }

        if self.model != other.model {
            return Err(AppError::Knowledge(format!(
                "Model mismatch: expected '{}', got '{}'",
                self.model, other.model
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::Knowledge(format!(
                "Dimension mismatch: expected {}, got {}",
                self.dimensions, other.dimensions
            )));
        }

        Ok(())
    }
}

impl fmt::Display for EmbeddingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.provider, self.model, self.dimensions)
    }
}
