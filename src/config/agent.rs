//! Agent configuration.
//!
//! Loaded from an explicit path, ./toolbroker.yml, or
//! ~/.config/toolbroker/toolbroker.yml.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::broker::BrokerTimeouts;
use crate::llm::AnthropicConfig;
use crate::llm::anthropic::{DEFAULT_API_KEY_ENV, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = "toolbroker.yml";

const DEFAULT_PERSONA: &str = "You are a customer support assistant with access to tools. \
ALWAYS use the appropriate tool for user requests.";

/// Configuration for one chat agent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent name, used in logs.
    pub name: String,

    /// Opening of the system prompt.
    pub persona: String,

    /// Most recent messages sent to the LLM per turn.
    #[serde(rename = "max-turns")]
    pub max_turns: usize,

    /// Upper bound on one whole chat turn in milliseconds.
    #[serde(rename = "turn-timeout-ms")]
    pub turn_timeout_ms: u64,

    /// Provider declarations file.
    #[serde(rename = "providers-file")]
    pub providers_file: Option<PathBuf>,

    /// LLM settings.
    pub llm: LlmConfig,

    /// Broker timeouts.
    pub broker: BrokerConfig,

    /// Tool classification.
    pub tools: ToolsConfig,

    /// Schema digest settings.
    #[serde(rename = "schema-context")]
    pub schema_context: SchemaContextConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "customer_support".to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            max_turns: 5,
            turn_timeout_ms: 120_000,
            providers_file: None,
            llm: LlmConfig::default(),
            broker: BrokerConfig::default(),
            tools: ToolsConfig::default(),
            schema_context: SchemaContextConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. toolbroker.yml in current directory
    /// 3. ~/.config/toolbroker/toolbroker.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from {}", PROJECT_CONFIG_FILE);
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", PROJECT_CONFIG_FILE, e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("toolbroker").join(PROJECT_CONFIG_FILE);
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            eyre::bail!("max-turns must be > 0");
        }
        if self.turn_timeout_ms == 0 {
            eyre::bail!("turn-timeout-ms must be > 0");
        }
        if self.llm.max_tokens == 0 {
            eyre::bail!("llm.max-tokens must be > 0");
        }
        if self.llm.timeout_ms == 0 {
            eyre::bail!("llm.timeout-ms must be > 0");
        }

        let b = &self.broker;
        if b.discovery_timeout_ms == 0 || b.call_timeout_ms == 0 || b.health_timeout_ms == 0 {
            eyre::bail!("broker timeouts must be > 0");
        }
        if b.call_timeout_ms < b.discovery_timeout_ms || b.call_timeout_ms < b.health_timeout_ms {
            eyre::bail!("broker.call-timeout-ms must be at least the discovery and health timeouts");
        }
        Ok(())
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    pub fn broker_timeouts(&self) -> BrokerTimeouts {
        BrokerTimeouts {
            discovery: Duration::from_millis(self.broker.discovery_timeout_ms),
            call: Duration::from_millis(self.broker.call_timeout_ms),
            health: Duration::from_millis(self.broker.health_timeout_ms),
        }
    }

    pub fn anthropic_config(&self) -> AnthropicConfig {
        AnthropicConfig {
            model: self.llm.model.clone(),
            max_tokens: self.llm.max_tokens,
            timeout: Duration::from_millis(self.llm.timeout_ms),
        }
    }
}

/// LLM settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,

    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Timeout per LLM call in milliseconds.
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Environment variable for the API key.
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_ms: 60_000,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

/// Broker timeouts in milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BrokerConfig {
    #[serde(rename = "discovery-timeout-ms")]
    pub discovery_timeout_ms: u64,

    #[serde(rename = "call-timeout-ms")]
    pub call_timeout_ms: u64,

    #[serde(rename = "health-timeout-ms")]
    pub health_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            discovery_timeout_ms: 10_000,
            call_timeout_ms: 30_000,
            health_timeout_ms: 5_000,
        }
    }
}

/// Which tools are data queries and which count as data operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tools whose results may be charted.
    #[serde(rename = "query-tools")]
    pub query_tools: Vec<String>,

    /// Name prefixes reported as database operations.
    #[serde(rename = "data-prefixes")]
    pub data_prefixes: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            query_tools: vec!["execute_query".to_string(), "get_table_data".to_string()],
            data_prefixes: vec![
                "execute_".to_string(),
                "describe_".to_string(),
                "list_".to_string(),
                "get_table".to_string(),
            ],
        }
    }
}

/// Tools used to build the schema digest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchemaContextConfig {
    pub enabled: bool,

    #[serde(rename = "list-tool")]
    pub list_tool: String,

    #[serde(rename = "describe-tool")]
    pub describe_tool: String,

    #[serde(rename = "table-argument")]
    pub table_argument: String,
}

impl Default for SchemaContextConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            list_tool: "list_tables".to_string(),
            describe_tool: "describe_table".to_string(),
            table_argument: "table_name".to_string(),
        }
    }
}
