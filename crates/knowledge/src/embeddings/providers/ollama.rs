//! Ollama embedding provider (`/api/embed`).

use crate::embeddings::EmbeddingProvider;
use newsdesk_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBED_ENDPOINT: &str = "/api/embed";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Neural embeddings served by a local Ollama runtime.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider. No request is made until the first embed call.
    pub fn new(endpoint: Option<&str>, model: String, dimensions: usize) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Knowledge(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: endpoint
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .trim_end_matches('/')
                .to_string(),
            model,
            dimensions,
        })
    }

    fn check_dimensions(&self, embeddings: &[Vec<f32>]) -> AppResult<()> {
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(AppError::Knowledge(format!(
                "Ollama model '{}' returned {} dimensions, expected {}",
                self.model,
                bad.len(),
                self.dimensions
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}{}", self.base_url, EMBED_ENDPOINT);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::Knowledge(format!(
                    "Ollama not reachable at {}: {}. Ensure it is running and run: ollama pull {}",
                    self.base_url, e, self.model
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            return Err(AppError::Knowledge(format!(
                "Ollama embedding error ({}): {}",
                status, message
            )));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            AppError::Knowledge(format!("Failed to parse Ollama embedding response: {}", e))
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(AppError::Knowledge(format!(
                "Ollama returned {} embeddings for {} inputs",
                body.embeddings.len(),
                texts.len()
            )));
        }
        self.check_dimensions(&body.embeddings)?;

        Ok(body.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_metadata() {
        let provider =
            OllamaProvider::new(Some("http://localhost:11434/"), "nomic-embed-text".into(), 768)
                .unwrap();
        assert_eq!(provider.base_url, "http://localhost:11434");
        assert_eq!(provider.identity().to_string(), "ollama:nomic-embed-text:768");
    }

    #[test]
    fn test_dimension_check() {
        let provider = OllamaProvider::new(None, "m".into(), 3).unwrap();
        assert!(provider.check_dimensions(&[vec![0.0; 3]]).is_ok());
        assert!(provider.check_dimensions(&[vec![0.0; 4]]).is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let provider = OllamaProvider::new(Some("http://127.0.0.1:9"), "m".into(), 3).unwrap();
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_request_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let json = serde_json::to_value(EmbedRequest {
            model: "m",
            input: &input,
        })
        .unwrap();
        assert_eq!(json["input"][1], "b");
    }
}
