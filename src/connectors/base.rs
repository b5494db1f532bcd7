//! Base connector trait for MCP connections
use crate::error::{Error, Result};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, Tool, ToolResult, MCP_VERSION};
use serde_json::Value;

/// Trait for different connection transports
///
/// Connectors handle the low-level communication with MCP servers.
///
/// The trait provides both low-level (send_request) and high-level methods (list_tools, call_tool).
/// Default implementations of high-level methods use send_request.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Send a raw JSON-RPC request and receive a response
    async fn send_request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse>;

    /// Establish a connection to the MCP server
    async fn connect(&self) -> Result<()>;

    /// Close the connection to the MCP server
    async fn disconnect(&self) -> Result<()>;

    /// Check if connector is currently connected
    fn is_connected(&self) -> bool;

    /// Send `method` and unwrap the JSON-RPC envelope.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let response = self.send_request(JsonRpcRequest::new(method, params)).await?;

        if let Some(error) = response.error {
            Err(Error::ServerError(format!("{} (code {})", error.message, error.code)))
        } else if let Some(result) = response.result {
            Ok(result)
        } else {
            Err(Error::InternalError("No result or error in response".to_string()))
        }
    }

    /// Initialize the MCP connection
    ///
    /// Sends the initialize request and returns server capabilities
    async fn initialize(&self) -> Result<Value> {
        let params = serde_json::json!({
            "protocolVersion": MCP_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        self.request("initialize", Some(params)).await
    }

    /// Tell the server the handshake is complete
    async fn notify_initialized(&self) -> Result<()> {
        self.request("notifications/initialized", None).await?;
        Ok(())
    }

    /// List all available tools from the server
    async fn list_tools(&self) -> Result<Vec<Tool>> {
        let result = self.request("tools/list", None).await?;
        let tools = result
            .get("tools")
            .cloned()
            .ok_or_else(|| Error::InvalidRequest("Invalid tools response".to_string()))?;
        Ok(serde_json::from_value(tools)?)
    }

    /// Call a tool on the server
    async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<ToolResult> {
        let params = serde_json::json!({
            "name": tool_name,
            "arguments": arguments,
        });
        let result = self.request("tools/call", Some(params)).await?;
        serde_json::from_value::<ToolResult>(result)
            .map_err(|e| Error::InvalidRequest(format!("Invalid tool result: {}", e)))
    }
}
