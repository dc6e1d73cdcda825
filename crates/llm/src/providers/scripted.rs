//! Provider that replays canned replies in order.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use newsdesk_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued replies and records every request it receives.
///
/// An `Err` entry makes the matching call fail with `AppError::Llm`. Calls
/// past the end of the script also fail.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Ok(reply.into()));
        }
    }

    /// Queue a failing call.
    pub fn push_failure(&self, message: impl Into<String>) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Err(message.into()));
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests
            .lock()
            .map_err(|_| AppError::Llm("scripted client lock poisoned".to_string()))?
            .push(request.clone());

        let next = self
            .replies
            .lock()
            .map_err(|_| AppError::Llm("scripted client lock poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(content)) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            Some(Err(message)) => Err(AppError::Llm(message)),
            None => Err(AppError::Llm("scripted client has no replies left".to_string())),
        }
    }
}
