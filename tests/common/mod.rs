//! Test providers served by axum on ephemeral ports

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use toolbroker::broker::ProviderDescriptor;

/// Declarative description of a fake provider
#[derive(Clone)]
pub struct Provider {
    tools: Vec<Value>,
    results: HashMap<String, String>,
    failing_tools: Vec<String>,
    raw: HashMap<String, Value>,
    listing: Option<String>,
    health: StatusCode,
    health_delay: Duration,
    list_delay: Duration,
}

impl Default for Provider {
    fn default() -> Self {
        Self {
            tools: Vec::new(),
            results: HashMap::new(),
            failing_tools: Vec::new(),
            raw: HashMap::new(),
            listing: None,
            health: StatusCode::OK,
            health_delay: Duration::ZERO,
            list_delay: Duration::ZERO,
        }
    }
}

impl Provider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a tool with an object schema
    pub fn tool(mut self, name: &str, schema: Value) -> Self {
        self.tools.push(json!({
            "name": name,
            "description": format!("{} tool", name),
            "inputSchema": schema,
        }));
        self
    }

    /// Offer a tool that takes no arguments
    pub fn simple_tool(self, name: &str) -> Self {
        self.tool(name, json!({"type": "object", "properties": {}}))
    }

    pub fn result(mut self, tool: &str, text: &str) -> Self {
        self.results.insert(tool.to_string(), text.to_string());
        self
    }

    /// Calls to this tool answer 500
    pub fn failing(mut self, tool: &str) -> Self {
        self.failing_tools.push(tool.to_string());
        self
    }

    /// Calls to this tool answer with an arbitrary JSON body
    pub fn raw(mut self, tool: &str, body: Value) -> Self {
        self.raw.insert(tool.to_string(), body);
        self
    }

    /// Answer the tool listing with this body instead of the declared tools
    pub fn listing_body(mut self, body: &str) -> Self {
        self.listing = Some(body.to_string());
        self
    }

    pub fn health_status(mut self, status: StatusCode) -> Self {
        self.health = status;
        self
    }

    pub fn health_delay(mut self, delay: Duration) -> Self {
        self.health_delay = delay;
        self
    }

    pub fn list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = delay;
        self
    }

    pub async fn start(self) -> RunningProvider {
        let state = Arc::new(ProviderState {
            spec: self,
            list_fails: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        });

        let router = Router::new()
            .route("/mcp/tools", get(list_tools))
            .route("/mcp/call_tool", post(call_tool))
            .route("/health", get(health))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        RunningProvider {
            url: format!("http://{}", addr),
            state,
        }
    }
}

pub struct ProviderState {
    spec: Provider,
    list_fails: AtomicBool,
    calls: AtomicUsize,
}

pub struct RunningProvider {
    pub url: String,
    state: Arc<ProviderState>,
}

impl RunningProvider {
    pub fn descriptor(&self, name: &str) -> ProviderDescriptor {
        ProviderDescriptor::new(name, self.url.clone())
    }

    /// Make the tool listing answer 500 from now on
    pub fn fail_listing(&self, fail: bool) {
        self.state.list_fails.store(fail, Ordering::SeqCst);
    }

    /// Number of tool calls received
    pub fn call_count(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }
}

async fn list_tools(State(state): State<Arc<ProviderState>>) -> Response {
    tokio::time::sleep(state.spec.list_delay).await;
    if state.list_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "listing unavailable").into_response();
    }
    if let Some(body) = &state.spec.listing {
        return ([(header::CONTENT_TYPE, "application/json")], body.clone()).into_response();
    }
    Json(json!({ "tools": state.spec.tools })).into_response()
}

async fn call_tool(State(state): State<Arc<ProviderState>>, Json(body): Json<Value>) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let name = body["name"].as_str().unwrap_or_default().to_string();

    if state.spec.failing_tools.contains(&name) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database exploded").into_response();
    }
    if let Some(raw) = state.spec.raw.get(&name) {
        return Json(raw.clone()).into_response();
    }

    let text = state
        .spec
        .results
        .get(&name)
        .cloned()
        .unwrap_or_else(|| format!("{} called with {}", name, body["arguments"]));
    Json(json!({ "content": [{ "type": "text", "text": text }] })).into_response()
}

async fn health(State(state): State<Arc<ProviderState>>) -> StatusCode {
    tokio::time::sleep(state.spec.health_delay).await;
    state.spec.health
}

/// An address nothing listens on
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
