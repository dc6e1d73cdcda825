//! Offline provider that drafts from its own input.
//!
//! Lets the full pipeline run without network access or credentials.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use newsdesk_core::AppResult;

const ECHO_PREVIEW_CHARS: usize = 200;

/// Returns `[<tag>] draft based on: <first 200 chars of the last message>`.
#[derive(Debug, Default, Clone)]
pub struct EchoClient;

impl EchoClient {
    pub fn new() -> Self {
        Self
    }

    fn draft(request: &LlmRequest) -> String {
        let name = request.tag.as_deref().unwrap_or("agent");
        let preview: String = request
            .last_content()
            .chars()
            .take(ECHO_PREVIEW_CHARS)
            .collect();
        format!("[{}] draft based on: {}", name, preview)
    }
}

#[async_trait::async_trait]
impl LlmClient for EchoClient {
    fn provider_name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        Ok(LlmResponse {
            content: Self::draft(request),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}
