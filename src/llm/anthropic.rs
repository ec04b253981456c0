//! Anthropic API client implementation
//!
//! This module implements the LlmClient trait for the Anthropic (Claude) API.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{BrokerError, Result};
use crate::llm::client::LlmClient;
use crate::llm::types::{CompletionRequest, CompletionResponse, ResponseBlock, Role, StopReason, ToolCall, Usage};

/// Anthropic API base URL
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model to use
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Default max tokens
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Configuration for the Anthropic client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(60),
        }
    }
}

impl AnthropicConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: AnthropicConfig,
    usage: Mutex<Usage>,
}

impl AnthropicClient {
    /// Create a client reading the API key from ANTHROPIC_API_KEY
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        Self::from_env(DEFAULT_API_KEY_ENV, config)
    }

    /// Create a client reading the API key from `env_var`
    pub fn from_env(env_var: &str, config: AnthropicConfig) -> Result<Self> {
        let api_key =
            std::env::var(env_var).map_err(|_| BrokerError::Config(format!("{} not set", env_var)))?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrokerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
            usage: Mutex::new(Usage::default()),
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request(&self, request: &CompletionRequest) -> Value {
        let model = request.model.as_ref().unwrap_or(&self.config.model).clone();

        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);

        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content
                })
            })
            .collect();

        let mut body = json!({
            "model": model,
            "max_tokens": max_tokens,
            "messages": messages
        });

        if !request.system.is_empty() {
            body["system"] = json!(request.system);
        }

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(|t| t.to_anthropic_schema()).collect();
            body["tools"] = json!(tools);
        }

        body
    }

    /// Parse the API response into a CompletionResponse
    fn parse_response(&self, body: Value) -> Result<CompletionResponse> {
        let Some(content) = body["content"].as_array() else {
            return Err(BrokerError::UpstreamModelFailure(
                "response has no content array".to_string(),
            ));
        };

        let stop_reason = match body["stop_reason"].as_str() {
            Some("end_turn") => StopReason::EndTurn,
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        let usage = if let Some(u) = body.get("usage") {
            Usage::new(
                u["input_tokens"].as_u64().unwrap_or(0),
                u["output_tokens"].as_u64().unwrap_or(0),
            )
        } else {
            Usage::default()
        };

        self.usage.lock().add(&usage);

        let mut blocks = Vec::new();
        for block in content {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(text) = block["text"].as_str() {
                        blocks.push(ResponseBlock::text(text));
                    }
                }
                Some("tool_use") => {
                    let id = block["id"].as_str().unwrap_or("").to_string();
                    let name = block["name"].as_str().unwrap_or("").to_string();
                    let input = block["input"].clone();
                    blocks.push(ResponseBlock::ToolUse(ToolCall::new(id, name, input)));
                }
                other => log::debug!("Ignoring response block of type {:?}", other),
            }
        }

        Ok(CompletionResponse {
            blocks,
            stop_reason,
            usage,
        })
    }

    /// Send a request to the Anthropic API
    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BrokerError::UpstreamModelFailure(format!("Request failed: {}", e)))?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(BrokerError::UpstreamModelFailure(format!(
                "Rate limited, retry after {} seconds",
                retry_after
            )));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BrokerError::UpstreamModelFailure(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BrokerError::UpstreamModelFailure(format!("Failed to parse response: {}", e)))
    }

    /// Get cumulative token usage
    pub fn total_usage(&self) -> Usage {
        self.usage.lock().clone()
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request);
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("model", &self.config.model)
            .field("max_tokens", &self.config.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AnthropicClient {
        AnthropicClient::with_api_key("test-key".to_string(), AnthropicConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = AnthropicConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_config_with_model() {
        let config = AnthropicConfig::with_model("claude-3-haiku-20240307");
        assert_eq!(config.model, "claude-3-haiku-20240307");
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_client_missing_env_var() {
        let result = AnthropicClient::from_env("TOOLBROKER_TEST_KEY_THAT_IS_NEVER_SET", AnthropicConfig::default());
        assert!(matches!(result, Err(BrokerError::Config(_))));
    }

    #[test]
    fn test_client_with_api_key() {
        let client = client();
        assert!(client.is_ready());
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_build_request_basic() {
        let request = CompletionRequest::new("You are helpful").with_user_message("Hello");
        let body = client().build_request(&request);

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], DEFAULT_MAX_TOKENS);
        assert_eq!(body["system"], "You are helpful");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_build_request_with_tools() {
        let tool = crate::llm::ToolDefinition::new(
            "get_current_weather",
            "[weather] Current weather for a city",
            json!({
                "type": "object",
                "properties": { "city": { "type": "string" } },
                "required": ["city"]
            }),
        );

        let request = CompletionRequest::new("test")
            .with_user_message("Weather in Paris?")
            .with_tools(vec![tool]);

        let body = client().build_request(&request);

        assert!(body["tools"].is_array());
        assert_eq!(body["tools"][0]["name"], "get_current_weather");
    }

    #[test]
    fn test_build_request_custom_model() {
        let request = CompletionRequest::new("test")
            .with_user_message("Hello")
            .with_model("claude-sonnet-4-20250514");

        let body = client().build_request(&request);
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_parse_response_keeps_block_order() {
        let api_response = json!({
            "content": [
                { "type": "text", "text": "Let me check" },
                {
                    "type": "tool_use",
                    "id": "toolu_123",
                    "name": "list_tables",
                    "input": {}
                }
            ],
            "stop_reason": "tool_use",
            "usage": { "input_tokens": 50, "output_tokens": 30 }
        });

        let response = client().parse_response(api_response).unwrap();

        assert_eq!(response.blocks.len(), 2);
        assert_eq!(response.blocks[0], ResponseBlock::text("Let me check"));
        assert_eq!(response.tool_calls()[0].name, "list_tables");
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage, Usage::new(50, 30));
    }

    #[test]
    fn test_parse_response_missing_content_is_upstream_failure() {
        let result = client().parse_response(json!({ "stop_reason": "end_turn" }));
        assert!(matches!(result, Err(BrokerError::UpstreamModelFailure(_))));
    }

    #[test]
    fn test_parse_response_stop_reasons() {
        let client = client();
        let cases = vec![
            ("end_turn", StopReason::EndTurn),
            ("tool_use", StopReason::ToolUse),
            ("max_tokens", StopReason::MaxTokens),
            ("stop_sequence", StopReason::StopSequence),
            ("unknown", StopReason::EndTurn),
        ];

        for (reason, expected) in cases {
            let response = client
                .parse_response(json!({ "content": [], "stop_reason": reason }))
                .unwrap();
            assert_eq!(response.stop_reason, expected);
        }
    }

    #[test]
    fn test_total_usage_accumulation() {
        let client = client();
        let _ = client.parse_response(json!({
            "content": [],
            "usage": { "input_tokens": 100, "output_tokens": 50 }
        }));
        let _ = client.parse_response(json!({
            "content": [],
            "usage": { "input_tokens": 200, "output_tokens": 100 }
        }));

        assert_eq!(client.total_usage(), Usage::new(300, 150));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let debug_str = format!("{:?}", client());
        assert!(debug_str.contains("AnthropicClient"));
        assert!(!debug_str.contains("test-key"));
    }

    #[test]
    fn test_empty_api_key_not_ready() {
        let client = AnthropicClient::with_api_key(String::new(), AnthropicConfig::default()).unwrap();
        assert!(!client.is_ready());
    }
}
