use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use cli::Cli;
use cli::commands::Commands;
use toolbroker::broker::{Broker, arguments_from_value};
use toolbroker::chat::ToolUseLoop;
use toolbroker::config::{self, AgentConfig};
use toolbroker::llm::{AnthropicClient, Message};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolbroker")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("toolbroker.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_broker(cli: &Cli, config: &AgentConfig) -> Result<Arc<Broker>> {
    let registry = config::load_providers(cli.providers.as_deref(), config);
    if registry.is_empty() {
        println!("{}", "No providers configured".yellow());
    }
    let broker = Broker::new(registry, config.broker_timeouts()).context("Failed to create broker")?;
    Ok(Arc::new(broker))
}

async fn run_application(cli: &Cli, config: &AgentConfig) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let broker = build_broker(cli, config)?;

    match &cli.command {
        Commands::Tools => handle_tools_command(&broker).await,
        Commands::Health => handle_health_command(&broker).await,
        Commands::Call { tool, args } => handle_call_command(&broker, tool, args).await,
        Commands::Chat { message } => handle_chat_command(broker, config, message).await,
    }
}

async fn handle_tools_command(broker: &Broker) -> Result<()> {
    let catalog = broker.discover().await;
    let stats = broker.stats();

    println!(
        "{} {} tools from {} providers",
        "Discovered".green(),
        stats.total_tools,
        stats.total_providers
    );

    for provider in &stats.providers {
        println!("\n{}", provider.cyan().bold());
        let Some(names) = stats.tools_by_provider.get(provider) else {
            println!("  {}", "(no tools)".dimmed());
            continue;
        };
        for name in names {
            let description = catalog.get(name).map(|t| t.description.as_str()).unwrap_or("");
            println!("  {} {}", name.bold(), description.dimmed());
        }
    }
    Ok(())
}

async fn handle_health_command(broker: &Broker) -> Result<()> {
    let snapshot = broker.check_all().await;

    for (provider, healthy) in &snapshot.providers {
        let status = if *healthy { "healthy".green() } else { "unhealthy".red() };
        println!("{:<20} {}", provider, status);
    }

    println!(
        "\n{}/{} providers healthy at {}",
        snapshot.healthy_count(),
        snapshot.len(),
        snapshot.checked_at.to_rfc3339()
    );

    if snapshot.all_down() {
        println!("{}", "All providers are down".red().bold());
    }
    Ok(())
}

async fn handle_call_command(broker: &Broker, tool: &str, args: &str) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(args).context("--args must be valid JSON")?;
    let arguments = arguments_from_value(tool, value)?;

    broker.discover().await;

    match broker.call(tool, arguments).await {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "Error:".red(), e.user_message());
            Err(e).context(format!("Tool call '{}' failed", tool))
        }
    }
}

async fn handle_chat_command(broker: Arc<Broker>, config: &AgentConfig, message: &str) -> Result<()> {
    let llm = AnthropicClient::from_env(&config.llm.api_key_env, config.anthropic_config())
        .context("Failed to create LLM client")?;

    let chat = ToolUseLoop::new(Arc::new(llm), broker, config);
    let response = chat.run_turn(&[Message::user(message)]).await;

    let rendered = serde_json::to_string_pretty(&response).context("Failed to render response")?;
    if response.success {
        println!("{}", rendered);
    } else {
        println!("{}", rendered.red());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();

    let config = config::load_agent_config(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
