//! Federated tool broker
//!
//! The broker knows a set of independently deployed tool providers, discovers
//! the tools they expose, routes calls to the owning provider, and reports
//! provider liveness.
//!
//! ```text
//! ToolUseLoop ──call──▶ Broker ──POST──▶ provider /mcp/call_tool
//!                         │
//!                         ├─ discover ──GET──▶ every provider /mcp/tools  (concurrent)
//!                         └─ check_all ─GET──▶ every provider /health     (concurrent)
//! ```
//!
//! A `Broker` is constructed explicitly and shared behind an `Arc`; there is no
//! process-wide instance.

mod catalog;
mod discovery;
mod dispatch;
mod health;
mod provider;
mod validate;
pub mod wire;

pub use catalog::{BrokerStats, Catalog, CatalogHandle, ToolDescriptor};
pub use health::HealthSnapshot;
pub use provider::{
    DEFAULT_CALL_TOOL_PATH, DEFAULT_HEALTH_PATH, DEFAULT_LIST_TOOLS_PATH, Endpoint, ProviderDescriptor,
    ProviderEndpoints, ProviderRegistry,
};
pub use validate::{ToolArguments, arguments_from_value, validate_arguments};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::error::{BrokerError, Result};

/// Outcome of a tool call: the tool's text, or a typed failure
pub type ToolCallResult = Result<String>;

/// Network timeouts for the three provider operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerTimeouts {
    pub discovery: Duration,
    pub call: Duration,
    pub health: Duration,
}

impl Default for BrokerTimeouts {
    fn default() -> Self {
        Self {
            discovery: Duration::from_secs(10),
            call: Duration::from_secs(30),
            health: Duration::from_secs(5),
        }
    }
}

/// What the chat loop needs from a broker
#[async_trait]
pub trait ToolBroker: Send + Sync {
    /// Rebuild the catalog from every provider
    async fn discover(&self) -> Arc<Catalog>;

    /// The current catalog without touching the network
    fn catalog(&self) -> Arc<Catalog>;

    /// Call a tool by name
    async fn call(&self, tool_name: &str, arguments: ToolArguments) -> ToolCallResult;

    /// Probe every provider
    async fn check_all(&self) -> HealthSnapshot;
}

/// HTTP-backed broker over a provider registry
pub struct Broker {
    registry: ProviderRegistry,
    catalog: CatalogHandle,
    http: Client,
    timeouts: BrokerTimeouts,
    /// Held while a new catalog is computed and installed
    refresh: Mutex<()>,
}

impl Broker {
    /// Create a broker over the given providers
    pub fn new(registry: ProviderRegistry, timeouts: BrokerTimeouts) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| BrokerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            registry,
            catalog: CatalogHandle::new(),
            http,
            timeouts,
            refresh: Mutex::new(()),
        })
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// The current catalog snapshot
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.snapshot()
    }

    /// Descriptor of a discovered tool
    pub fn tool_info(&self, name: &str) -> Option<ToolDescriptor> {
        self.catalog.snapshot().get(name).cloned()
    }

    /// Descriptor of a registered provider
    pub fn provider_info(&self, name: &str) -> Option<ProviderDescriptor> {
        self.registry.get(name).ok()
    }

    /// Summary of providers and the current catalog
    pub fn stats(&self) -> BrokerStats {
        let catalog = self.catalog.snapshot();
        BrokerStats {
            total_providers: self.registry.len(),
            total_tools: catalog.len(),
            providers: self.registry.names(),
            tools_by_provider: catalog.tools_by_provider(),
        }
    }
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("providers", &self.registry.names())
            .field("tools", &self.catalog.snapshot().len())
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

#[async_trait]
impl ToolBroker for Broker {
    async fn discover(&self) -> Arc<Catalog> {
        Broker::discover(self).await
    }

    fn catalog(&self) -> Arc<Catalog> {
        Broker::catalog(self)
    }

    async fn call(&self, tool_name: &str, arguments: ToolArguments) -> ToolCallResult {
        Broker::call(self, tool_name, arguments).await
    }

    async fn check_all(&self) -> HealthSnapshot {
        Broker::check_all(self).await
    }
}
