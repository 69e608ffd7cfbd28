//! Mock Language Model - scriptable LanguageModel for tests and local runs.
//!
//! Supports a fixed response, an ordered queue of responses, responses keyed
//! by a substring of the user prompt (useful when per-item calls fan out
//! concurrently and arrival order is unknown), and a pure failure mode. All
//! received requests are recorded for assertions.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ports::{
    CompletionRequest, CompletionResponse, LanguageModel, LlmError, ProviderInfo,
};

enum Behavior {
    /// Always return the same content.
    Fixed(String),
    /// Pop responses in order; error when exhausted.
    Queue(Mutex<VecDeque<String>>),
    /// Return the response whose needle first matches the user prompt.
    Keyed(Vec<(String, String)>),
    /// Always fail with an unavailable error.
    Fail(String),
}

/// Scriptable mock implementation of [`LanguageModel`].
pub struct MockLanguageModel {
    behavior: Behavior,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLanguageModel {
    /// Mock that always returns the same content.
    pub fn with_response(content: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fixed(content.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock that returns the given responses in order, then errors.
    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self {
            behavior: Behavior::Queue(Mutex::new(
                responses.into_iter().map(String::from).collect(),
            )),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock that answers each request with the response whose needle occurs
    /// in the user prompt. Needles are checked in order; no match is an
    /// error, which exercises the caller's failure path.
    pub fn with_keyed_responses(pairs: Vec<(&str, &str)>) -> Self {
        Self {
            behavior: Behavior::Keyed(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock whose every call fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        let content = match &self.behavior {
            Behavior::Fixed(content) => content.clone(),
            Behavior::Queue(queue) => queue
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::unavailable("mock response queue exhausted"))?,
            Behavior::Keyed(pairs) => pairs
                .iter()
                .find(|(needle, _)| request.user_prompt.contains(needle))
                .map(|(_, response)| response.clone())
                .ok_or_else(|| {
                    LlmError::InvalidRequest("no scripted response for prompt".to_string())
                })?,
            Behavior::Fail(message) => return Err(LlmError::unavailable(message.clone())),
        };

        Ok(CompletionResponse {
            content,
            model: "mock-model".to_string(),
        })
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model")
    }
}
