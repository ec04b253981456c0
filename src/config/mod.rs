//! Configuration for toolbroker.
//!
//! Two files:
//! 1. Agent config (toolbroker.yml): LLM, timeouts, tool policy
//! 2. Provider declarations (mcpServers JSON or YAML)

use eyre::Result;
use std::path::{Path, PathBuf};

use crate::broker::ProviderRegistry;

pub use self::agent::{
    AgentConfig, BrokerConfig, LlmConfig, PROJECT_CONFIG_FILE, SchemaContextConfig, ToolsConfig,
};
pub use self::providers::{ProvidersFile, ServerEntry, Transport};

mod agent;
mod providers;

/// Load and validate the agent configuration.
pub fn load_agent_config(config_path: Option<&PathBuf>) -> Result<AgentConfig> {
    let config = AgentConfig::load(config_path)?;
    config.validate()?;
    Ok(config)
}

/// Build the provider registry, preferring an explicit path over the agent config.
pub fn load_providers(explicit: Option<&Path>, config: &AgentConfig) -> ProviderRegistry {
    providers::load_providers(explicit.or(config.providers_file.as_deref()))
}
