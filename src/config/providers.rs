//! Provider declarations.
//!
//! ```yaml
//! mcpServers:
//!   db:
//!     description: Customer database
//!     transport:
//!       baseUrl: http://localhost:8001
//!       endpoints:
//!         listTools: /mcp/tools
//!         callTool: /mcp/call_tool
//!         health: /health
//! ```
//!
//! JSON files (by extension) use the same shape. Declaration order is kept.

use eyre::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::broker::{ProviderDescriptor, ProviderEndpoints, ProviderRegistry};

/// Parsed provider declarations file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersFile {
    #[serde(rename = "mcpServers", default, deserialize_with = "ordered_servers")]
    pub servers: Vec<(String, ServerEntry)>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerEntry {
    pub description: String,
    pub transport: Transport,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transport {
    pub base_url: String,
    pub endpoints: ProviderEndpoints,
}

fn ordered_servers<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, ServerEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, ServerEntry)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of provider name to provider declaration")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            let mut servers = Vec::new();
            while let Some((name, entry)) = map.next_entry::<String, ServerEntry>()? {
                servers.push((name, entry));
            }
            Ok(servers)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}

impl ProvidersFile {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        Self::parse(&content, path.extension().is_some_and(|ext| ext == "json"))
    }

    pub fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            serde_json::from_str(content).context("Failed to parse provider declarations as JSON")
        } else {
            serde_yaml::from_str(content).context("Failed to parse provider declarations as YAML")
        }
    }

    /// Descriptors in declaration order; entries without a base URL are skipped
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.servers
            .iter()
            .filter_map(|(name, entry)| {
                if entry.transport.base_url.is_empty() {
                    log::warn!("Provider '{}' has no baseUrl, skipping", name);
                    return None;
                }
                Some(
                    ProviderDescriptor::new(name.clone(), entry.transport.base_url.clone())
                        .with_description(entry.description.clone())
                        .with_endpoints(entry.transport.endpoints.clone()),
                )
            })
            .collect()
    }
}

/// Build a registry from a declarations file
///
/// A missing or malformed file is logged and yields an empty registry.
pub fn load_providers(path: Option<&Path>) -> ProviderRegistry {
    let Some(path) = path else {
        log::warn!("No providers file configured, starting with no providers");
        return ProviderRegistry::new();
    };

    match ProvidersFile::load_from_file(path) {
        Ok(file) => {
            let registry = ProviderRegistry::from_descriptors(file.descriptors());
            log::info!("Loaded {} providers from {}", registry.len(), path.display());
            registry
        }
        Err(e) => {
            log::error!("Failed to load provider configuration: {:#}", e);
            ProviderRegistry::new()
        }
    }
}
