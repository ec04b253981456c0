//! Chat layer - one tool-use turn per request
//!
//! ```text
//! messages ─▶ ToolUseLoop ─▶ health ─▶ discover ─▶ prompt ─▶ LLM ─▶ classify
//!                                                               │
//!                                       ChatResponse ◀── tool call or text
//! ```

pub mod chart;
pub mod prompt;
pub mod response;
pub mod schema;
pub mod turn;

pub use chart::{ChartData, ChartType, derive_chart};
pub use prompt::build_system_prompt;
pub use response::{ChatResponse, FALLBACK_GREETING, GENERIC_APOLOGY, ReasoningStep, SERVICE_UNAVAILABLE};
pub use schema::{SchemaCache, SchemaDigest, extract_table_names};
pub use turn::{ToolPolicy, ToolUseLoop, truncate_turns};
