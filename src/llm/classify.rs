//! Reduce a model response to the one thing the chat loop acts on

use crate::llm::types::{CompletionResponse, ResponseBlock, ToolCall};

/// What the model asked for this turn
#[derive(Debug, Clone, PartialEq)]
pub enum LlmReply {
    Text(String),
    ToolUse(ToolCall),
}

/// Classify a response
///
/// The first tool_use block wins over any text; later tool_use blocks are
/// ignored. Without a tool_use, non-empty text blocks are joined with
/// newlines. Returns `None` when the response carries neither.
pub fn classify(response: &CompletionResponse) -> Option<LlmReply> {
    let calls = response.tool_calls();
    if let Some(first) = calls.first() {
        if calls.len() > 1 {
            log::warn!(
                "Model requested {} tools; only '{}' will run",
                calls.len(),
                first.name
            );
        }
        return Some(LlmReply::ToolUse((*first).clone()));
    }

    let texts: Vec<&str> = response
        .blocks
        .iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        })
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(LlmReply::Text(texts.join("\n")))
    }
}
