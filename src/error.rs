//! Error types for toolbroker
//!
//! Centralized error handling using thiserror. Every failure in the broker and
//! the chat loop is request-scoped; nothing here is fatal to the process.

use thiserror::Error;

/// All error types that can occur in toolbroker
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Network failure or timeout talking to a provider
    #[error("Error calling {tool}: provider '{provider}' unreachable: {reason}")]
    ProviderUnreachable {
        provider: String,
        tool: String,
        reason: String,
    },

    /// Provider answered with a non-success status
    #[error("Error calling {tool}: provider '{provider}' returned {status}: {body}")]
    ProviderError {
        provider: String,
        tool: String,
        status: u16,
        body: String,
    },

    /// Tool name is not in the current catalog
    #[error("Tool '{name}' not found. Available tools: {}", .available.join(", "))]
    UnknownTool { name: String, available: Vec<String> },

    /// Provider payload did not match the expected shape
    #[error("Error calling {tool}: malformed response from '{provider}': {reason}")]
    MalformedResponse {
        provider: String,
        tool: String,
        reason: String,
    },

    /// Every registered provider failed its health probe
    #[error("All tool providers are unavailable")]
    AllProvidersDown,

    /// LLM call failed or returned something unusable
    #[error("Upstream model failure: {0}")]
    UpstreamModelFailure(String),

    /// Provider name is not registered
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Arguments rejected by the tool's input schema
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// Conversation cannot be sent to the model
    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrokerError {
    /// Build an unreachable-provider error from a transport failure
    pub fn unreachable(provider: impl Into<String>, tool: impl Into<String>, err: &reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        Self::ProviderUnreachable {
            provider: provider.into(),
            tool: tool.into(),
            reason,
        }
    }

    /// Build a malformed-response error
    pub fn malformed(provider: impl Into<String>, tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.into(),
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure means the tool could not be reached at all,
    /// as opposed to the tool itself reporting an error.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BrokerError::ProviderUnreachable { .. } | BrokerError::AllProvidersDown
        )
    }

    /// Text that is safe to relay to an end user.
    pub fn user_message(&self) -> String {
        match self {
            BrokerError::UnknownTool { .. } | BrokerError::InvalidArguments { .. } => self.to_string(),
            BrokerError::ProviderError { tool, status, .. } => {
                format!("Error calling {}: the tool reported a failure (status {}).", tool, status)
            }
            BrokerError::ProviderUnreachable { provider, tool, .. } => format!(
                "Error calling {}: the '{}' service is currently unreachable. Please try again later.",
                tool, provider
            ),
            BrokerError::MalformedResponse { provider, tool, .. } => format!(
                "Error calling {}: the '{}' service returned an unexpected response.",
                tool, provider
            ),
            BrokerError::AllProvidersDown => {
                "Tool services are currently unavailable. Please try again later.".to_string()
            }
            _ => "Sorry, I encountered an error. Please try again.".to_string(),
        }
    }
}

/// Result type alias for toolbroker operations
pub type Result<T> = std::result::Result<T, BrokerError>;
