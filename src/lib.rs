//! toolbroker - a federated tool broker and single-turn tool-use chat loop
//!
//! Independently deployed HTTP tool providers are discovered into one catalog,
//! calls are routed to the owning provider, and a chat turn lets an LLM pick at
//! most one tool to run before answering.

pub mod broker;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;

pub use broker::{Broker, BrokerTimeouts, ToolBroker};
pub use chat::{ChatResponse, ToolUseLoop};
pub use error::{BrokerError, Result};
