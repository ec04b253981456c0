//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - tools: discover and list tools by provider
//! - health: probe every provider
//! - call: call one tool directly
//! - chat: run a single chat turn

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// toolbroker - federated tool broker with a single-turn tool-use chat loop
#[derive(Parser, Debug)]
#[command(name = "toolbroker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Provider declarations file (overrides providers-file in the config)
    #[arg(short, long, global = true)]
    pub providers: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover and list tools grouped by provider
    Tools,

    /// Check provider health
    Health,

    /// Call a tool directly
    Call {
        /// Tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },

    /// Run one chat turn and print the response envelope
    Chat {
        /// User message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_with_args() {
        let cli = Cli::parse_from(["toolbroker", "call", "describe_table", "--args", r#"{"table_name":"orders"}"#]);
        match cli.command {
            Commands::Call { tool, args } => {
                assert_eq!(tool, "describe_table");
                assert_eq!(args, r#"{"table_name":"orders"}"#);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_call_args_default_to_empty_object() {
        let cli = Cli::parse_from(["toolbroker", "call", "list_tables"]);
        assert!(matches!(cli.command, Commands::Call { ref args, .. } if args == "{}"));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["toolbroker", "health", "-v", "--providers", "mcp.json"]);
        assert!(cli.is_verbose());
        assert_eq!(cli.providers, Some(PathBuf::from("mcp.json")));
        assert!(matches!(cli.command, Commands::Health));
    }

    #[test]
    fn test_chat_message() {
        let cli = Cli::parse_from(["toolbroker", "chat", "What tables exist?"]);
        assert!(matches!(cli.command, Commands::Chat { ref message } if message == "What tables exist?"));
    }
}
