//! Generation client abstraction and request/response types.
//!
//! Every stage talks to its model through [`LlmClient::complete`]: a role
//! description plus an ordered list of role-tagged messages in, one text blob
//! out.

use newsdesk_core::AppResult;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Model identifier (e.g., "llama3.2", "gpt-4o-mini")
    pub model: String,

    /// Role/behavioral description sent ahead of the messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Ordered conversation
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Caller label (stage name) used for logging and by the echo provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl LlmRequest {
    /// Create a request holding a single user message.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: None,
            temperature: None,
            tag: None,
        }
    }

    /// Create a request from an explicit message list.
    pub fn from_messages(messages: Vec<ChatMessage>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages,
            max_tokens: None,
            temperature: None,
            tag: None,
        }
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Label the request with the calling stage.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// System prompt followed by the conversation, as providers expect it.
    pub fn full_conversation(&self) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        if let Some(system) = &self.system {
            out.push(ChatMessage::system(system.clone()));
        }
        out.extend(self.messages.iter().cloned());
        out
    }

    /// Content of the final message, if any.
    pub fn last_content(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// Completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    pub usage: LlmUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LlmUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Trait for generation providers.
///
/// Implementations must not retry: a failed call is reported to the caller,
/// which decides whether the run continues.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "ollama", "openai").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming chat completion.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::new("Hello", "llama3.2")
            .with_system("You are terse.")
            .with_temperature(0.0)
            .with_max_tokens(64)
            .with_tag("researcher");

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, ChatRole::User);
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.tag.as_deref(), Some("researcher"));
        assert_eq!(request.last_content(), "Hello");
    }

    #[test]
    fn test_full_conversation_prepends_system() {
        let request = LlmRequest::from_messages(
            vec![ChatMessage::assistant("draft"), ChatMessage::user("edit it")],
            "m",
        )
        .with_system("role");

        let conv = request.full_conversation();
        assert_eq!(conv.len(), 3);
        assert_eq!(conv[0], ChatMessage::system("role"));
        assert_eq!(conv[2].content, "edit it");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::assistant("x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }

    #[test]
    fn test_usage_total() {
        let usage = LlmUsage::new(10, 5);
        assert_eq!(usage.total_tokens, 15);
    }
}
