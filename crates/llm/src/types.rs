//! Provider identifiers.

use serde::{Deserialize, Serialize};

/// Generation provider kinds understood by [`crate::create_client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OpenAI-compatible chat completions API
    OpenAI,
    /// Local Ollama runtime (default)
    Ollama,
    /// Offline stub that echoes a slice of its input
    Echo,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            "echo" | "stub" => Some(Self::Echo),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
            Self::Echo => "echo",
        }
    }

    /// Whether the provider needs an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("openai"), Some(ProviderType::OpenAI));
        assert_eq!(ProviderType::parse("OLLAMA"), Some(ProviderType::Ollama));
        assert_eq!(ProviderType::parse("stub"), Some(ProviderType::Echo));
        assert_eq!(ProviderType::parse("claude"), None);
    }

    #[test]
    fn test_api_key_requirement() {
        assert!(ProviderType::OpenAI.requires_api_key());
        assert!(!ProviderType::Ollama.requires_api_key());
        assert_eq!(ProviderType::Echo.as_str(), "echo");
    }
}
