//! Database schema digest used to ground the system prompt
//!
//! The digest is built once per process by listing tables through the broker
//! and describing each one. Concurrent first callers share a single build; a
//! failed build leaves the cache empty so the next turn tries again.

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::OnceCell;

use crate::broker::{ToolArguments, ToolBroker};
use crate::config::SchemaContextConfig;
use crate::error::{BrokerError, Result};

/// Table name -> description text, as returned by the describe tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDigest {
    tables: BTreeMap<String, String>,
}

impl SchemaDigest {
    pub fn new(tables: BTreeMap<String, String>) -> Self {
        Self { tables }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Prompt section; empty when there is nothing to show
    pub fn render(&self) -> String {
        if self.tables.is_empty() {
            return String::new();
        }

        let mut out = String::from("Database Schema:\n");
        for (table, schema) in &self.tables {
            out.push_str(&format!("\nTable: {}\n{}\n", table, schema));
        }
        out
    }
}

/// Pull table names out of a list-tables listing
///
/// A table is the text between the first and last `**` on any line that also
/// contains a digit, e.g. `1. **customers**`.
pub fn extract_table_names(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter(|line| line.contains("**") && line.chars().any(|c| c.is_ascii_digit()))
        .filter_map(|line| {
            let start = line.find("**")? + 2;
            let end = line.rfind("**")?;
            (start < end).then(|| line[start..end].to_string())
        })
        .collect()
}

/// Single-flight memo of the schema digest
#[derive(Debug)]
pub struct SchemaCache {
    config: SchemaContextConfig,
    digest: OnceCell<SchemaDigest>,
}

impl SchemaCache {
    pub fn new(config: SchemaContextConfig) -> Self {
        Self {
            config,
            digest: OnceCell::new(),
        }
    }

    /// Return the digest, building it through `broker` on first use
    pub async fn get_or_build<B: ToolBroker + ?Sized>(&self, broker: &B) -> Result<&SchemaDigest> {
        self.digest.get_or_try_init(|| self.build(broker)).await
    }

    async fn build<B: ToolBroker + ?Sized>(&self, broker: &B) -> Result<SchemaDigest> {
        let catalog = broker.catalog();
        if !catalog.contains(&self.config.list_tool) {
            return Err(BrokerError::UnknownTool {
                name: self.config.list_tool.clone(),
                available: catalog.names(),
            });
        }

        let listing = broker.call(&self.config.list_tool, ToolArguments::new()).await?;
        let tables = extract_table_names(&listing);
        log::debug!("Schema digest: found {} tables", tables.len());

        let mut described = BTreeMap::new();
        for table in tables {
            let mut args = ToolArguments::new();
            args.insert(self.config.table_argument.clone(), Value::String(table.clone()));

            match broker.call(&self.config.describe_tool, args).await {
                Ok(schema) if !schema.is_empty() => {
                    described.insert(table, schema);
                }
                Ok(_) => {}
                Err(e) => log::warn!("Failed to describe table '{}': {}", table, e),
            }
        }

        log::info!("Cached schema for {} tables", described.len());
        Ok(SchemaDigest::new(described))
    }
}
