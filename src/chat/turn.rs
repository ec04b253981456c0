//! Single-turn tool-use loop
//!
//! One chat request runs through
//! `Preparing -> AwaitingLlm -> (ToolRequested | TextOnly) -> Done`.
//! At most one tool is invoked per turn. Every failure ends as a structured
//! `ChatResponse`; causes go to the log, never to the caller.

use std::sync::Arc;
use std::time::Duration;

use crate::broker::{ToolBroker, arguments_from_value};
use crate::config::{AgentConfig, ToolsConfig};
use crate::error::{BrokerError, Result};
use crate::llm::{CompletionRequest, LlmClient, LlmReply, Message, ToolCall, classify};

use super::chart::derive_chart;
use super::prompt::build_system_prompt;
use super::response::{ChatResponse, ReasoningStep};
use super::schema::{SchemaCache, SchemaDigest};

/// Phase of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Preparing,
    AwaitingLlm,
    ToolRequested,
    TextOnly,
    Done,
}

impl TurnState {
    /// Whether `next` may follow `self`
    fn can_transition_to(self, next: TurnState) -> bool {
        use TurnState::*;
        matches!(
            (self, next),
            (Preparing, AwaitingLlm)
                | (Preparing, Done)
                | (AwaitingLlm, ToolRequested)
                | (AwaitingLlm, TextOnly)
                | (AwaitingLlm, Done)
                | (ToolRequested, Done)
                | (TextOnly, Done)
        )
    }
}

/// States visited by one turn, in order
struct TurnTracker {
    path: Vec<TurnState>,
}

impl TurnTracker {
    fn new() -> Self {
        Self {
            path: vec![TurnState::Preparing],
        }
    }

    fn state(&self) -> TurnState {
        self.path.last().copied().unwrap_or(TurnState::Preparing)
    }

    fn advance(&mut self, next: TurnState) {
        let current = self.state();
        if !current.can_transition_to(next) {
            log::warn!("Unexpected turn transition {:?} -> {:?}", current, next);
        }
        log::debug!("Turn {:?} -> {:?}", current, next);
        self.path.push(next);
    }
}

/// Tool classification used for reasoning headers and charts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPolicy {
    query_tools: Vec<String>,
    data_prefixes: Vec<String>,
}

impl ToolPolicy {
    pub fn from_config(config: &ToolsConfig) -> Self {
        Self {
            query_tools: config.query_tools.clone(),
            data_prefixes: config.data_prefixes.clone(),
        }
    }

    /// Results of these tools may be charted
    pub fn is_query_tool(&self, name: &str) -> bool {
        self.query_tools.iter().any(|t| t == name)
    }

    /// Reported as a database operation
    pub fn is_data_operation(&self, name: &str) -> bool {
        self.data_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

impl Default for ToolPolicy {
    fn default() -> Self {
        Self::from_config(&ToolsConfig::default())
    }
}

/// The most recent `max_turns` messages; the input is left untouched
pub fn truncate_turns(messages: &[Message], max_turns: usize) -> Vec<Message> {
    let start = messages.len().saturating_sub(max_turns);
    messages[start..].to_vec()
}

#[derive(Debug, Clone)]
struct TurnSettings {
    persona: String,
    max_turns: usize,
    max_tokens: u32,
    model: String,
    turn_timeout: Duration,
}

/// Runs chat turns against an LLM and a tool broker
pub struct ToolUseLoop<L, B>
where
    L: LlmClient,
    B: ToolBroker,
{
    llm: Arc<L>,
    broker: Arc<B>,
    settings: TurnSettings,
    policy: ToolPolicy,
    schema: Option<SchemaCache>,
}

impl<L, B> ToolUseLoop<L, B>
where
    L: LlmClient,
    B: ToolBroker,
{
    pub fn new(llm: Arc<L>, broker: Arc<B>, config: &AgentConfig) -> Self {
        let schema = config
            .schema_context
            .enabled
            .then(|| SchemaCache::new(config.schema_context.clone()));

        Self {
            llm,
            broker,
            settings: TurnSettings {
                persona: config.persona.clone(),
                max_turns: config.max_turns,
                max_tokens: config.llm.max_tokens,
                model: config.llm.model.clone(),
                turn_timeout: config.turn_timeout(),
            },
            policy: ToolPolicy::from_config(&config.tools),
            schema,
        }
    }

    /// Run one chat turn; always produces an envelope
    pub async fn run_turn(&self, messages: &[Message]) -> ChatResponse {
        let mut tracker = TurnTracker::new();
        let outcome = tokio::time::timeout(self.settings.turn_timeout, self.execute(messages, &mut tracker)).await;
        log::debug!("Turn ended in {:?} after {:?}", tracker.state(), tracker.path);

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(BrokerError::AllProvidersDown)) => {
                log::error!("Chat refused: no healthy tool providers");
                ChatResponse::unavailable()
            }
            Ok(Err(e)) => {
                log::error!("Chat error: {}", e);
                ChatResponse::apology()
            }
            Err(_) => {
                log::error!("Chat turn timed out after {:?}", self.settings.turn_timeout);
                ChatResponse::apology()
            }
        }
    }

    async fn execute(&self, messages: &[Message], tracker: &mut TurnTracker) -> Result<ChatResponse> {
        if messages.is_empty() {
            return Err(BrokerError::InvalidConversation("conversation is empty".to_string()));
        }

        let health = self.broker.check_all().await;
        if health.all_down() {
            return Err(BrokerError::AllProvidersDown);
        }

        if !self.llm.is_ready() {
            return Err(BrokerError::UpstreamModelFailure(format!(
                "client for model '{}' is not ready",
                self.llm.model()
            )));
        }

        let window = truncate_turns(messages, self.settings.max_turns);
        if window.is_empty() {
            return Err(BrokerError::InvalidConversation(
                "nothing left after truncation".to_string(),
            ));
        }
        if window.len() < messages.len() {
            log::debug!("Truncated conversation from {} to {} messages", messages.len(), window.len());
        }

        let catalog = self.broker.discover().await;
        if catalog.is_empty() {
            log::warn!("No tools discovered; answering with the greeting");
            tracker.advance(TurnState::Done);
            return Ok(ChatResponse::greeting());
        }

        let digest = self.schema_digest().await;
        let system = build_system_prompt(&self.settings.persona, &catalog, digest);

        let request = CompletionRequest::new(system)
            .with_messages(window)
            .with_tools(catalog.to_definitions())
            .with_max_tokens(self.settings.max_tokens)
            .with_model(self.settings.model.clone());

        tracker.advance(TurnState::AwaitingLlm);
        log::info!("Calling LLM with {} tools: {:?}", catalog.len(), catalog.names());
        let response = self.llm.complete(request).await?;

        let reply = match classify(&response) {
            Some(LlmReply::ToolUse(call)) => {
                tracker.advance(TurnState::ToolRequested);
                self.invoke_tool(call).await
            }
            Some(LlmReply::Text(text)) => {
                tracker.advance(TurnState::TextOnly);
                ChatResponse::success(text)
            }
            None => {
                log::info!("Model returned neither a tool call nor text");
                ChatResponse::greeting()
            }
        };

        tracker.advance(TurnState::Done);
        Ok(reply)
    }

    async fn invoke_tool(&self, call: ToolCall) -> ChatResponse {
        let step = ReasoningStep::for_tool(&call.name, &call.input, self.policy.is_data_operation(&call.name));
        log::info!("Calling tool: {} with {}", call.name, call.input);

        let result = match arguments_from_value(&call.name, call.input) {
            Ok(args) => self.broker.call(&call.name, args).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(text) if text.trim().is_empty() => {
                log::warn!("Tool '{}' returned no text", call.name);
                ChatResponse::greeting()
            }
            Ok(text) => {
                let chart = if self.policy.is_query_tool(&call.name) {
                    derive_chart(&text)
                } else {
                    None
                };
                ChatResponse::success(text).with_reasoning(step).with_chart(chart)
            }
            Err(e) => {
                if e.is_unavailable() {
                    log::warn!("Tool '{}' unavailable: {}", call.name, e);
                } else {
                    log::error!("Tool '{}' failed: {}", call.name, e);
                }
                ChatResponse::failure(e.user_message()).with_reasoning(step)
            }
        }
    }

    async fn schema_digest(&self) -> Option<&SchemaDigest> {
        let cache = self.schema.as_ref()?;
        match cache.get_or_build(self.broker.as_ref()).await {
            Ok(digest) => Some(digest),
            Err(e) => {
                log::warn!("Schema context unavailable: {}", e);
                None
            }
        }
    }
}
