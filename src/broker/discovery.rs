//! Tool discovery across all registered providers
//!
//! Every provider is queried concurrently. A provider that fails contributes
//! no tools for the pass; the others are unaffected. The resulting catalog
//! replaces the previous one wholesale. Discovery passes and runtime provider
//! additions are serialized so neither overwrites the other.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;

use super::Broker;
use super::catalog::{Catalog, ToolDescriptor};
use super::dispatch::truncate_body;
use super::provider::{Endpoint, ProviderDescriptor};
use super::wire::ListToolsResponse;
use crate::error::{BrokerError, Result};

/// Operation name reported in listing errors
const LIST_TOOLS: &str = "list_tools";

/// Fetch and tag the tools of a single provider
pub(crate) async fn fetch_tools(
    http: &Client,
    provider: &ProviderDescriptor,
    timeout: Duration,
) -> Result<Vec<ToolDescriptor>> {
    let url = provider.url(Endpoint::ListTools);
    log::debug!("Listing tools from '{}' at {}", provider.name, url);

    let response = http
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| BrokerError::unreachable(&provider.name, LIST_TOOLS, &e))?;

    let status = response.status();
    if !status.is_success() {
        let body = truncate_body(response.text().await.unwrap_or_default());
        return Err(BrokerError::ProviderError {
            provider: provider.name.clone(),
            tool: LIST_TOOLS.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let listing: ListToolsResponse = response.json().await.map_err(|e| {
        if e.is_decode() {
            BrokerError::malformed(&provider.name, LIST_TOOLS, format!("invalid tool listing: {}", e))
        } else {
            BrokerError::unreachable(&provider.name, LIST_TOOLS, &e)
        }
    })?;

    Ok(listing
        .tools
        .into_iter()
        .map(|tool| tool.into_descriptor(&provider.name))
        .collect())
}

impl Broker {
    /// Run a full discovery pass and install the resulting catalog
    pub async fn discover(&self) -> Arc<Catalog> {
        let _refresh = self.refresh.lock().await;
        let providers = self.registry.all();
        let timeout = self.timeouts.discovery;

        let results = join_all(providers.iter().map(|p| fetch_tools(&self.http, p, timeout))).await;

        // join_all preserves order, so collisions resolve to the later-registered provider
        let mut catalog = Catalog::new();
        for (provider, result) in providers.iter().zip(results) {
            match result {
                Ok(tools) => {
                    tracing::info!(provider = %provider.name, tools = tools.len(), "Discovered tools");
                    for tool in tools {
                        catalog.insert(tool);
                    }
                }
                Err(e) => {
                    tracing::warn!(provider = %provider.name, error = %e, "Tool discovery failed");
                }
            }
        }

        log::info!(
            "Discovery complete: {} tools from {} providers",
            catalog.len(),
            providers.len()
        );
        self.catalog.replace(catalog)
    }

    /// Register a provider at runtime and merge its tools into the catalog
    ///
    /// The provider is only registered if its tools can be listed. Returns the
    /// number of tools it contributed.
    pub async fn add_provider(&self, descriptor: ProviderDescriptor) -> Result<usize> {
        let tools = match fetch_tools(&self.http, &descriptor, self.timeouts.discovery).await {
            Ok(tools) => tools,
            Err(e) => {
                log::error!("Failed to add provider '{}': {}", descriptor.name, e);
                return Err(e);
            }
        };

        let count = tools.len();
        let name = descriptor.name.clone();

        // A discovery pass in flight would otherwise install a catalog without these tools
        let _refresh = self.refresh.lock().await;
        self.registry.register(descriptor);

        let mut catalog = (*self.catalog.snapshot()).clone();
        catalog.remove_provider(&name);
        for tool in tools {
            catalog.insert(tool);
        }
        self.catalog.replace(catalog);

        log::info!("Added provider '{}' with {} tools", name, count);
        Ok(count)
    }
}
