//! Outbound chat envelope

use serde::{Deserialize, Serialize};

use super::chart::ChartData;

/// Shown when the model offers neither a tool call nor text
pub const FALLBACK_GREETING: &str = "Hello! I can help with database queries, weather, and meeting scheduling.";

/// Shown for any failure whose cause must stay in the logs
pub const GENERIC_APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

/// Shown when no provider is healthy
pub const SERVICE_UNAVAILABLE: &str = "Service unavailable: no tool providers are currently reachable. Please try again later.";

/// Trace entry describing the tool invocation behind a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    #[serde(rename = "type")]
    pub category: String,
    pub header: String,
    pub content: String,
}

impl ReasoningStep {
    /// Step for a tool call; data operations get their own header
    pub fn for_tool(name: &str, arguments: &serde_json::Value, data_operation: bool) -> Self {
        let kind = if data_operation { "Database" } else { "Tool" };
        Self {
            category: "tool".to_string(),
            header: format!("{} Operation", kind),
            content: format!("**Tool:** {}\n**Args:** {}", name, arguments),
        }
    }
}

/// Result of one chat turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_step: Option<ReasoningStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartData>,
}

impl ChatResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            reasoning_step: None,
            chart_data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::success(message)
        }
    }

    pub fn apology() -> Self {
        Self::failure(GENERIC_APOLOGY)
    }

    pub fn unavailable() -> Self {
        Self::failure(SERVICE_UNAVAILABLE)
    }

    pub fn greeting() -> Self {
        Self::success(FALLBACK_GREETING)
    }

    pub fn with_reasoning(mut self, step: ReasoningStep) -> Self {
        self.reasoning_step = Some(step);
        self
    }

    pub fn with_chart(mut self, chart: Option<ChartData>) -> Self {
        self.chart_data = chart;
        self
    }
}
