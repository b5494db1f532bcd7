//! MCP tool server for company and stock lookups.

use stock_mcp::config::{DEFAULT_STOCK_SERVER_ADDR, ToolServerSettings};
use stock_mcp::logging::init_logging;
use stock_mcp::server::{self, McpServer, ServerConfig};
use stock_mcp::tools::StockTools;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_mcp::load_env();
    let settings = ToolServerSettings::from_env("STOCK_SERVER_ADDR", DEFAULT_STOCK_SERVER_ADDR)?;
    init_logging(settings.log_level);

    let server = Arc::new(McpServer::new(
        ServerConfig::new("Stock MCP Server"),
        Arc::new(StockTools::default()),
    ));

    for tool in server.handle_tools_list().await {
        log::info!("Tool registered: {}", tool.name);
    }

    server::serve(&settings.addr, server::router(server)).await?;
    Ok(())
}
