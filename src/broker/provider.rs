//! Provider registry - static connection metadata for tool providers
//!
//! Descriptors are created once from configuration. The registry is read
//! concurrently by discovery, dispatch and health checks; writes only happen at
//! startup or through an explicit add-provider.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, Result};

/// Default relative path for listing a provider's tools
pub const DEFAULT_LIST_TOOLS_PATH: &str = "/mcp/tools";

/// Default relative path for calling a tool
pub const DEFAULT_CALL_TOOL_PATH: &str = "/mcp/call_tool";

/// Default relative path for the health probe
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Relative paths a provider exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderEndpoints {
    pub list_tools: String,
    pub call_tool: String,
    pub health: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            list_tools: DEFAULT_LIST_TOOLS_PATH.to_string(),
            call_tool: DEFAULT_CALL_TOOL_PATH.to_string(),
            health: DEFAULT_HEALTH_PATH.to_string(),
        }
    }
}

/// Which provider endpoint to address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListTools,
    CallTool,
    Health,
}

/// Connection metadata for one tool provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub base_url: String,
    pub endpoints: ProviderEndpoints,
    pub description: String,
}

impl ProviderDescriptor {
    /// Create a descriptor with the default endpoint paths
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            endpoints: ProviderEndpoints::default(),
            description: String::new(),
        }
    }

    /// Set the human description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the endpoint paths
    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Absolute URL for one of the provider's endpoints
    pub fn url(&self, endpoint: Endpoint) -> String {
        let path = match endpoint {
            Endpoint::ListTools => &self.endpoints.list_tools,
            Endpoint::CallTool => &self.endpoints.call_tool,
            Endpoint::Health => &self.endpoints.health,
        };
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

/// Ordered, name-keyed set of provider descriptors
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: RwLock<Vec<ProviderDescriptor>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from descriptors, in order
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ProviderDescriptor>) -> Self {
        let registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor);
        }
        registry
    }

    /// Register a provider. Re-registering a name replaces the descriptor in place.
    pub fn register(&self, descriptor: ProviderDescriptor) {
        let mut providers = self.providers.write();
        match providers.iter_mut().find(|p| p.name == descriptor.name) {
            Some(existing) => {
                log::debug!("Replacing provider '{}'", descriptor.name);
                *existing = descriptor;
            }
            None => {
                log::debug!("Registered provider '{}' at {}", descriptor.name, descriptor.base_url);
                providers.push(descriptor);
            }
        }
    }

    /// Look up a provider by name
    pub fn get(&self, name: &str) -> Result<ProviderDescriptor> {
        self.providers
            .read()
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| BrokerError::ProviderNotFound(name.to_string()))
    }

    /// All providers in registration order
    pub fn all(&self) -> Vec<ProviderDescriptor> {
        self.providers.read().clone()
    }

    /// Remove a provider, returning it if it was registered
    pub fn remove(&self, name: &str) -> Option<ProviderDescriptor> {
        let mut providers = self.providers.write();
        let index = providers.iter().position(|p| p.name == name)?;
        Some(providers.remove(index))
    }

    /// Provider names in registration order
    pub fn names(&self) -> Vec<String> {
        self.providers.read().iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}
