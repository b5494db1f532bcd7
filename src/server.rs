use crate::error::{Error, Result};
use crate::protocol::*;
use async_trait::async_trait;
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Handler for tool execution
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Definitions of the tools this handler can execute.
    fn tools(&self) -> Vec<Tool>;

    async fn execute(&self, name: &str, arguments: Value) -> Result<Vec<ResultContent>>;
}

/// Deserialize tool arguments into a parameter type.
///
/// A missing (`null`) argument object is treated as `{}`.
pub fn parse_arguments<P: DeserializeOwned>(arguments: Value) -> Result<P> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments).map_err(|e| Error::InvalidParams(e.to_string()))
}

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub capabilities: ServerCapabilities,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "MCP Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: ServerCapabilities::tools_only(),
        }
    }
}

/// MCP Server
pub struct McpServer {
    config: ServerConfig,
    tools: Arc<DashMap<String, Tool>>,
    tool_handler: Arc<dyn ToolHandler>,
}

impl McpServer {
    /// Create a new MCP server advertising every tool of `tool_handler`
    pub fn new(config: ServerConfig, tool_handler: Arc<dyn ToolHandler>) -> Self {
        let server = Self {
            config,
            tools: Arc::new(DashMap::new()),
            tool_handler,
        };
        for tool in server.tool_handler.tools() {
            server.register_tool(tool);
        }
        server
    }

    /// Register a tool
    pub fn register_tool(&self, tool: Tool) {
        self.tools.insert(tool.name.to_string(), tool);
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle initialize request
    pub fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": MCP_VERSION,
            "capabilities": self.config.capabilities,
            "serverInfo": {
                "name": self.config.name,
                "version": self.config.version,
            }
        })
    }

    /// Handle tools/list request. Tools are sorted by name.
    pub async fn handle_tools_list(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self
            .tools
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Handle tools/call request
    ///
    /// Failures raised by the tool itself come back as an `isError` result so
    /// the caller's model can read them. Unknown tools and malformed
    /// arguments are protocol errors.
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> Result<ToolResult> {
        if !self.tools.contains_key(name) {
            return Err(Error::ToolNotFound(name.to_string()));
        }

        match self.tool_handler.execute(name, arguments).await {
            Ok(content) => Ok(ToolResult::success(content)),
            Err(e @ (Error::ToolNotFound(_) | Error::InvalidParams(_))) => Err(e),
            Err(e) => {
                log::warn!("Tool '{}' failed: {}", name, e);
                Ok(ToolResult::error(e.to_string()))
            }
        }
    }

    async fn dispatch_tool_call(&self, params: Option<Value>) -> Result<Value> {
        let params = params.ok_or_else(|| Error::InvalidParams("Missing params".to_string()))?;
        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::InvalidParams("Missing tool name".to_string()))?;
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        log::debug!("tools/call {} {}", name, arguments);
        let result = self.handle_tool_call(name, arguments).await?;
        Ok(serde_json::to_value(result)?)
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" | "notifications/initialized" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.handle_tools_list().await })),
            "tools/call" => self.dispatch_tool_call(request.params).await,
            other => Err(Error::MethodNotFound(other.to_string())),
        };

        match outcome {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => {
                log::debug!("{} failed: {}", request.method, e);
                JsonRpcResponse::failure(request.id, e.error_code(), e.to_string())
            }
        }
    }
}

/// Decode a request body. Malformed JSON is a parse error; well-formed JSON
/// that is not a request is an invalid request.
fn decode_request(body: &[u8]) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        let err = Error::ParseError(e.to_string());
        JsonRpcResponse::failure(Value::Null, err.error_code(), err.to_string())
    })?;
    let id = value.get("id").cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| {
        let err = Error::InvalidRequest(e.to_string());
        JsonRpcResponse::failure(id, err.error_code(), err.to_string())
    })
}

// Handler: POST / (JSON-RPC endpoint)
async fn handle_rpc(State(server): State<Arc<McpServer>>, body: Bytes) -> Json<JsonRpcResponse> {
    match decode_request(&body) {
        Ok(request) => Json(server.handle_request(request).await),
        Err(response) => {
            log::debug!("Rejected request body: {:?}", response.error);
            Json(response)
        }
    }
}

/// HTTP routes exposing `server` as a JSON-RPC endpoint at `/`.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/", post(handle_rpc))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Bind `addr` and serve `router` until Ctrl-C.
pub async fn serve(addr: &str, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::ConnectionError(format!("Failed to bind {}: {}", addr, e)))?;

    log::info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::ConnectionError(e.to_string()))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        log::info!("Shutting down");
    }
}
