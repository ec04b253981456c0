//! Tool catalog - the unified, provider-tagged set of discovered tools
//!
//! A `Catalog` is an immutable snapshot. Discovery builds a fresh one and swaps
//! it into the `CatalogHandle`; readers holding the old `Arc` keep a consistent
//! view until they ask for a new snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::ToolDefinition;

/// A tool offered by some provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    /// Name of the provider that owns this tool
    pub provider: String,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            provider: provider.into(),
        }
    }

    /// Shape offered to the LLM; the description is prefixed with the provider
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name.clone(),
            format!("[{}] {}", self.provider, self.description),
            self.input_schema.clone(),
        )
    }
}

/// Immutable name-keyed catalog snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tool; a later insert with the same name replaces the earlier one
    pub fn insert(&mut self, tool: ToolDescriptor) {
        if let Some(previous) = self.tools.get(&tool.name)
            && previous.provider != tool.provider
        {
            log::warn!(
                "Tool '{}' from provider '{}' shadows the one from '{}'",
                tool.name,
                tool.provider,
                previous.provider
            );
        }
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Drop every tool owned by `provider`
    pub fn remove_provider(&mut self, provider: &str) {
        self.tools.retain(|_, tool| tool.provider != provider);
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tool names in sorted order
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn tools(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool names grouped by owning provider
    pub fn tools_by_provider(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for tool in self.tools.values() {
            grouped.entry(tool.provider.clone()).or_default().push(tool.name.clone());
        }
        grouped
    }

    /// Tool definitions for an LLM request
    pub fn to_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(ToolDescriptor::to_definition).collect()
    }
}

impl FromIterator<ToolDescriptor> for Catalog {
    fn from_iter<I: IntoIterator<Item = ToolDescriptor>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for tool in iter {
            catalog.insert(tool);
        }
        catalog
    }
}

/// Shared pointer to the current catalog
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    /// Replace the current snapshot wholesale, returning the new one
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        *self.current.write() = catalog.clone();
        catalog
    }
}

/// Summary of the broker's providers and tools
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerStats {
    pub total_providers: usize,
    pub total_tools: usize,
    pub providers: Vec<String>,
    pub tools_by_provider: BTreeMap<String, Vec<String>>,
}
