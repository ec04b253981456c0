//! Provider HTTP payloads
//!
//! - `GET  <list>`   -> `{"tools": [{"name", "description", "inputSchema"}]}`
//! - `POST <call>`   <- `{"name", "arguments"}`, -> `{"content": [{"type": "text", "text"}]}`
//! - `GET  <health>` -> 200 when healthy

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::catalog::ToolDescriptor;

/// Body of a list-tools response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    pub tools: Vec<RemoteTool>,
}

/// One tool as a provider declares it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default = "empty_schema")]
    pub input_schema: Value,
}

impl RemoteTool {
    /// Tag with the owning provider
    pub fn into_descriptor(self, provider: &str) -> ToolDescriptor {
        ToolDescriptor::new(self.name, self.description, self.input_schema, provider)
    }
}

fn empty_schema() -> Value {
    serde_json::json!({"type": "object", "properties": {}})
}

/// Body of a call-tool request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolRequest {
    pub name: String,
    pub arguments: Map<String, Value>,
}

/// Body of a successful call-tool response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResponse {
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl CallToolResponse {
    /// The first text content item, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|item| item.kind == "text")
            .and_then(|item| item.text.as_deref())
    }
}
