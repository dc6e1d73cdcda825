//! LLM provider factory.
//!
//! Resolves a provider name from configuration into a shared client.

use crate::client::LlmClient;
use crate::providers::{EchoClient, OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use newsdesk_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama", "echo")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key for providers that require one
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let kind = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    tracing::debug!(provider = kind.as_str(), "Creating LLM client");

    match kind {
        ProviderType::Ollama => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(url, key),
                None => OpenAiClient::new(key),
            };
            Ok(Arc::new(client))
        }
        ProviderType::Echo => Ok(Arc::new(EchoClient::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None) {
            Err(err) => assert!(err.to_string().contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
        assert!(create_client("openai", None, Some("")).is_err());
        assert!(create_client("openai", None, Some("sk-test")).is_ok());
    }

    #[test]
    fn test_create_echo_client() {
        let client = create_client("echo", None, None).unwrap();
        assert_eq!(client.provider_name(), "echo");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
