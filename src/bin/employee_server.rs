//! MCP tool server answering employee questions.

use stock_mcp::config::{DEFAULT_EMPLOYEE_SERVER_ADDR, ToolServerSettings};
use stock_mcp::logging::init_logging;
use stock_mcp::server::{self, McpServer, ServerConfig};
use stock_mcp::tools::EmployeeTools;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_mcp::load_env();
    let settings =
        ToolServerSettings::from_env("EMPLOYEE_SERVER_ADDR", DEFAULT_EMPLOYEE_SERVER_ADDR)?;
    init_logging(settings.log_level);

    let server = Arc::new(McpServer::new(
        ServerConfig::new("Employee MCP Server"),
        Arc::new(EmployeeTools),
    ));

    server::serve(&settings.addr, server::router(server)).await?;
    Ok(())
}
