//! LlmClient trait and a scripted mock for tests

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{BrokerError, Result};
use crate::llm::types::{CompletionRequest, CompletionResponse};

/// Stateless LLM client - each call is independent
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Model identifier used when a request does not name one
    fn model(&self) -> &str;

    /// Whether the client can make requests at all
    fn is_ready(&self) -> bool;
}

/// Mock client that replays queued responses and records every request
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    model: String,
}

impl MockLlmClient {
    /// Create a mock that answers with `responses` in order
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock that answers with successes or failures in order
    pub fn with_results(results: Vec<Result<CompletionResponse>>) -> Self {
        Self {
            responses: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
            model: "mock-model".to_string(),
        }
    }

    /// Create a mock whose every call fails
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_results(vec![Err(BrokerError::UpstreamModelFailure(reason.into()))])
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Copies of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(BrokerError::UpstreamModelFailure("no more mock responses".to_string())))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_ready(&self) -> bool {
        true
    }
}
