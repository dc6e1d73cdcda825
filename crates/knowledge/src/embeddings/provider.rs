//! Embedding provider trait and factory.

use crate::embeddings::config::EmbeddingIdentity;
use crate::embeddings::providers::{OllamaProvider, TrigramProvider};
use newsdesk_core::{AppError, AppResult, EmbeddingSettings};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts, one vector per text, in order.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }

    /// Identity recorded alongside every collection built with this provider.
    fn identity(&self) -> EmbeddingIdentity {
        EmbeddingIdentity::new(self.provider_name(), self.model_name(), self.dimensions())
    }
}

/// Create an embedding provider from settings.
pub fn create_provider(settings: &EmbeddingSettings) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if settings.dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be greater than 0".to_string(),
        ));
    }

    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramProvider::new(
            settings.model.clone(),
            settings.dimensions,
        ))),

        "ollama" => Ok(Arc::new(OllamaProvider::new(
            settings.endpoint.as_deref(),
            settings.model.clone(),
            settings.dimensions,
        )?)),

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            settings.provider
        ))),
    }
}
