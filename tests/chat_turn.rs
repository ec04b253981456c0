//! End-to-end chat turns: mock LLM, real broker, live HTTP providers

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use toolbroker::broker::{Broker, BrokerTimeouts, ProviderRegistry};
use toolbroker::chat::{ChatResponse, ToolUseLoop};
use toolbroker::config::AgentConfig;
use toolbroker::llm::{CompletionResponse, Message, MockLlmClient};

use common::{Provider, RunningProvider, unreachable_url};

fn broker(providers: &[(&str, &RunningProvider)]) -> Arc<Broker> {
    let registry = ProviderRegistry::from_descriptors(providers.iter().map(|(name, p)| p.descriptor(name)));
    let timeouts = BrokerTimeouts {
        discovery: Duration::from_secs(2),
        call: Duration::from_secs(2),
        health: Duration::from_millis(300),
    };
    Arc::new(Broker::new(registry, timeouts).unwrap())
}

#[tokio::test]
async fn test_list_tables_turn() {
    let db = Provider::new()
        .simple_tool("list_tables")
        .result("list_tables", "## Tables\n1. customers")
        .start()
        .await;
    let broker = broker(&[("db", &db)]);
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::tool_use(
        "toolu_1",
        "list_tables",
        json!({}),
    )]));

    let chat = ToolUseLoop::new(llm.clone(), broker, &AgentConfig::default());
    let response = chat.run_turn(&[Message::user("What tables do we have?")]).await;

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "success": true,
            "message": "## Tables\n1. customers",
            "reasoning_step": {
                "type": "tool",
                "header": "Database Operation",
                "content": "**Tool:** list_tables\n**Args:** {}"
            }
        })
    );
    assert!(response.chart_data.is_none());
    assert_eq!(llm.request_count(), 1);
    assert!(llm.requests()[0].tools[0].description.starts_with("[db]"));
}

#[tokio::test]
async fn test_all_providers_down_never_reaches_llm() {
    let db = Provider::new()
        .simple_tool("list_tables")
        .health_status(StatusCode::SERVICE_UNAVAILABLE)
        .start()
        .await;
    let weather = Provider::new()
        .simple_tool("get_current_weather")
        .health_status(StatusCode::INTERNAL_SERVER_ERROR)
        .start()
        .await;
    let broker = broker(&[("db", &db), ("weather", &weather)]);
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("never sent")]));

    let chat = ToolUseLoop::new(llm.clone(), broker, &AgentConfig::default());
    let response = chat.run_turn(&[Message::user("hi")]).await;

    assert_eq!(response, ChatResponse::unavailable());
    assert_eq!(llm.request_count(), 0);
}

#[tokio::test]
async fn test_no_providers_is_unavailable() {
    let broker = Arc::new(Broker::new(ProviderRegistry::new(), BrokerTimeouts::default()).unwrap());
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("never sent")]));

    let chat = ToolUseLoop::new(llm.clone(), broker, &AgentConfig::default());
    let response = chat.run_turn(&[Message::user("hi")]).await;

    assert!(!response.success);
    assert_eq!(llm.request_count(), 0);
}

#[tokio::test]
async fn test_text_reply_turn() {
    let weather = Provider::new().simple_tool("get_current_weather").start().await;
    let broker = broker(&[("weather", &weather)]);
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("Hello")]));

    let chat = ToolUseLoop::new(llm, broker, &AgentConfig::default());
    let response = chat.run_turn(&[Message::user("hi")]).await;

    assert_eq!(serde_json::to_value(&response).unwrap(), json!({"success": true, "message": "Hello"}));
    assert_eq!(weather.call_count(), 0);
}

#[tokio::test]
async fn test_query_turn_with_chart_and_schema() {
    let table = "| region | revenue |\n|---|---|\n| north | 120 |\n| south | 80 |";
    let db = Provider::new()
        .simple_tool("list_tables")
        .tool(
            "describe_table",
            json!({
                "type": "object",
                "properties": { "table_name": { "type": "string" } },
                "required": ["table_name"]
            }),
        )
        .tool(
            "execute_query",
            json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        )
        .result("list_tables", "## 📋 Database Tables\n\n1. **sales**\n")
        .result("describe_table", "region TEXT\nrevenue REAL")
        .result("execute_query", table)
        .start()
        .await;
    let broker = broker(&[("db", &db)]);
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::tool_use(
        "toolu_1",
        "execute_query",
        json!({"query": "SELECT region, revenue FROM sales"}),
    )]));

    let chat = ToolUseLoop::new(llm.clone(), broker, &AgentConfig::default());
    let response = chat.run_turn(&[Message::user("Revenue by region?")]).await;

    assert!(response.success);
    assert_eq!(response.message, table);
    assert_eq!(response.reasoning_step.as_ref().unwrap().header, "Database Operation");
    let chart = serde_json::to_value(response.chart_data.as_ref().unwrap()).unwrap();
    assert_eq!(chart["type"], "pie");
    assert_eq!(chart["data"]["labels"], json!(["north", "south"]));

    assert!(llm.requests()[0].system.contains("Table: sales\nregion TEXT\nrevenue REAL"));
    // list_tables + describe_table for the digest, then the query itself
    assert_eq!(db.call_count(), 3);
}

#[tokio::test]
async fn test_provider_failure_is_relayed_without_details() {
    let db = Provider::new()
        .simple_tool("execute_query")
        .failing("execute_query")
        .start()
        .await;
    let broker = broker(&[("db", &db)]);
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::tool_use(
        "toolu_1",
        "execute_query",
        json!({}),
    )]));

    let chat = ToolUseLoop::new(llm, broker, &AgentConfig::default());
    let response = chat.run_turn(&[Message::user("run it")]).await;

    assert!(!response.success);
    assert!(response.message.contains("execute_query"));
    assert!(!response.message.contains("exploded"));
    assert!(response.reasoning_step.is_some());
}

#[tokio::test]
async fn test_half_down_providers_still_chat() {
    let db = Provider::new().simple_tool("list_tables").start().await;
    let gone = unreachable_url().await;
    let registry = ProviderRegistry::from_descriptors(vec![
        db.descriptor("db"),
        toolbroker::broker::ProviderDescriptor::new("weather", gone),
    ]);
    let broker = Arc::new(Broker::new(registry, BrokerTimeouts::default()).unwrap());
    let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("Hi there")]));

    let chat = ToolUseLoop::new(llm, broker, &AgentConfig::default());
    let response = chat.run_turn(&[Message::user("hi")]).await;

    assert_eq!(response, ChatResponse::success("Hi there"));
}
