//! LLM Client Layer - Anthropic API integration and response classification
//!
//! This module provides:
//! - Message types for LLM communication
//! - LlmClient trait for API abstraction
//! - AnthropicClient implementation
//! - Reduction of a response to a single reply

pub mod anthropic;
pub mod classify;
pub mod client;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use classify::{LlmReply, classify};
pub use client::{LlmClient, MockLlmClient};
pub use types::{
    CompletionRequest, CompletionResponse, Message, ResponseBlock, Role, StopReason, ToolCall, ToolDefinition, Usage,
};
