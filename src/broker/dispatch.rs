//! Call dispatch - route a tool call to its owning provider

use super::provider::Endpoint;
use super::validate::{ToolArguments, validate_arguments};
use super::wire::{CallToolRequest, CallToolResponse};
use super::{Broker, ToolCallResult};
use crate::error::BrokerError;

/// Provider bodies longer than this are cut before they land in an error
const MAX_ERROR_BODY_CHARS: usize = 500;

pub(crate) fn truncate_body(body: String) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body;
    }
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

impl Broker {
    /// Call a tool by name
    ///
    /// Never panics: every failure comes back as a `BrokerError` whose
    /// `user_message()` can be relayed to the end user.
    pub async fn call(&self, tool_name: &str, arguments: ToolArguments) -> ToolCallResult {
        let catalog = self.catalog.snapshot();
        let unknown = || BrokerError::UnknownTool {
            name: tool_name.to_string(),
            available: catalog.names(),
        };

        let Some(tool) = catalog.get(tool_name) else {
            log::warn!("Call for unknown tool '{}'", tool_name);
            return Err(unknown());
        };

        let provider = match self.registry.get(&tool.provider) {
            Ok(provider) => provider,
            Err(_) => {
                log::warn!(
                    "Tool '{}' points at unregistered provider '{}'",
                    tool_name,
                    tool.provider
                );
                return Err(unknown());
            }
        };

        validate_arguments(tool_name, &tool.input_schema, &arguments)?;

        let request = CallToolRequest {
            name: tool_name.to_string(),
            arguments,
        };

        log::info!("Calling tool '{}' on provider '{}'", tool_name, provider.name);

        let response = self
            .http
            .post(provider.url(Endpoint::CallTool))
            .timeout(self.timeouts.call)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let err = BrokerError::unreachable(&provider.name, tool_name, &e);
                log::error!("Tool call error for {}: {}", tool_name, err);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = truncate_body(response.text().await.unwrap_or_default());
            let err = BrokerError::ProviderError {
                provider: provider.name.clone(),
                tool: tool_name.to_string(),
                status: status.as_u16(),
                body,
            };
            log::error!("Tool call error for {}: {}", tool_name, err);
            return Err(err);
        }

        let payload: CallToolResponse = response.json().await.map_err(|e| {
            let err = if e.is_decode() {
                BrokerError::malformed(&provider.name, tool_name, format!("invalid call response: {}", e))
            } else {
                BrokerError::unreachable(&provider.name, tool_name, &e)
            };
            log::error!("Tool call error for {}: {}", tool_name, err);
            err
        })?;

        payload
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| BrokerError::malformed(&provider.name, tool_name, "tool response has no text content"))
    }
}
