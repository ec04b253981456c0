//! LLM types for Anthropic API communication
//!
//! This module defines the message types for LLM requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Tool definition for the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Convert to Anthropic API schema format
    pub fn to_anthropic_schema(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema
        })
    }
}

/// A tool call from the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// One content block of a model response, in the order the model produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text { text: String },
    ToolUse(ToolCall),
}

impl ResponseBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ResponseBlock::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ResponseBlock::ToolUse(ToolCall::new(id, name, input))
    }
}

/// Request to the LLM for completion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Create a new completion request with a system prompt
    pub fn new(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace the conversation
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Add a user message
    pub fn with_user_message(self, content: impl Into<String>) -> Self {
        self.with_message(Message::user(content))
    }

    /// Add tools to the request
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response from the LLM
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub blocks: Vec<ResponseBlock>,
    pub stop_reason: StopReason,
    pub usage: Usage,
}

impl CompletionResponse {
    /// A response holding a single text block
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![ResponseBlock::text(text)],
            ..Default::default()
        }
    }

    /// A response holding a single tool_use block
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            blocks: vec![ResponseBlock::tool_use(id, name, input)],
            stop_reason: StopReason::ToolUse,
            ..Default::default()
        }
    }

    /// Text blocks joined with newlines
    pub fn joined_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text.as_str()),
                ResponseBlock::ToolUse(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tool calls in response order
    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::ToolUse(call) => Some(call),
                ResponseBlock::Text { .. } => None,
            })
            .collect()
    }
}

/// Reason why the LLM stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    /// Create new usage stats
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Calculate total tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate usage from another instance
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");

        let msg = Message::assistant("Hi there");
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_tool_definition_to_anthropic_schema() {
        let tool = ToolDefinition::new(
            "describe_table",
            "[db] Describe a table",
            json!({
                "type": "object",
                "properties": { "table_name": { "type": "string" } },
                "required": ["table_name"]
            }),
        );

        let schema = tool.to_anthropic_schema();
        assert_eq!(schema["name"], "describe_table");
        assert_eq!(schema["description"], "[db] Describe a table");
        assert!(schema["input_schema"].is_object());
    }

    #[test]
    fn test_response_block_serialization() {
        let block = ResponseBlock::tool_use("t1", "list_tables", json!({}));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        assert_eq!(value["name"], "list_tables");

        let block = ResponseBlock::text("hi");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "hi");
    }

    #[test]
    fn test_completion_request_builder() {
        let req = CompletionRequest::new("You are a helpful assistant")
            .with_user_message("Hello")
            .with_max_tokens(1000)
            .with_model("claude-3-5-haiku-latest");

        assert_eq!(req.system, "You are a helpful assistant");
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.max_tokens, Some(1000));
        assert_eq!(req.model.as_deref(), Some("claude-3-5-haiku-latest"));
    }

    #[test]
    fn test_joined_text_skips_tool_use() {
        let response = CompletionResponse {
            blocks: vec![
                ResponseBlock::text("first"),
                ResponseBlock::tool_use("t1", "list_tables", json!({})),
                ResponseBlock::text("second"),
            ],
            ..Default::default()
        };
        assert_eq!(response.joined_text(), "first\nsecond");
        assert_eq!(response.tool_calls().len(), 1);
        assert_eq!(response.tool_calls()[0].name, "list_tables");
    }

    #[test]
    fn test_completion_response_default() {
        let resp = CompletionResponse::default();
        assert!(resp.blocks.is_empty());
        assert_eq!(resp.stop_reason, StopReason::EndTurn);
        assert_eq!(resp.usage.total(), 0);
    }

    #[test]
    fn test_usage_add() {
        let mut usage = Usage::new(100, 50);
        usage.add(&Usage::new(200, 100));
        assert_eq!(usage, Usage::new(300, 150));
        assert_eq!(usage.total(), 450);
    }
}
