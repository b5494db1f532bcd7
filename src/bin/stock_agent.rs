//! Chat agent: `GET /chat?query=...` answered by an LLM using the
//! tools of the configured MCP servers.

use anyhow::Context;
use stock_mcp::adapters::provider_from_settings;
use stock_mcp::agent::{Agent, AgentConfig};
use stock_mcp::chat;
use stock_mcp::client::McpClient;
use stock_mcp::config::AgentSettings;
use stock_mcp::logging::init_logging;
use stock_mcp::server;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_mcp::load_env();
    let settings = AgentSettings::from_env().context("invalid agent configuration")?;
    init_logging(settings.log_level);

    let llm = provider_from_settings(&settings)?;
    log::info!("LLM provider: {:?}", settings.provider);

    let client = McpClient::new(settings.servers.clone());
    client.connect_all().await?;
    match client.list_tools().await {
        Ok(tools) => log::info!("{} tools available", tools.len()),
        Err(e) => log::warn!("No tools available yet: {}", e),
    }

    let config = AgentConfig {
        max_iterations: settings.max_iterations,
        ..AgentConfig::default()
    };
    let agent = Arc::new(Agent::new(client.clone(), llm, config));

    server::serve(&settings.addr, chat::router(agent)).await?;
    client.close_all_sessions().await?;
    Ok(())
}
