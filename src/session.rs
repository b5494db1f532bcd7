//! Session to an MCP server. Wraps a connector and caches its tools.

use crate::connectors::base::Connector;
use crate::error::Result;
use crate::protocol::{Tool, ToolResult};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct Session {
    /// Unique name for this session (usually the server name)
    pub name: String,

    /// The underlying connector
    connector: Box<dyn Connector>,

    /// Whether the session has been initialized
    initialized: AtomicBool,

    /// Cached tools from the server (refreshed when needed)
    tools_cache: RwLock<BTreeMap<String, Tool>>,
}

impl Session {
    /// Create a new session with a connector
    pub fn new(name: impl Into<String>, connector: Box<dyn Connector>) -> Self {
        Self {
            name: name.into(),
            connector,
            initialized: AtomicBool::new(false),
            tools_cache: RwLock::new(BTreeMap::new()),
        }
    }

    /// Establish the connection
    pub async fn connect(&self) -> Result<()> {
        self.connector.connect().await
    }

    /// Initialize the session (send initialize request to server) and
    /// fill the tools cache
    pub async fn initialize(&self) -> Result<Value> {
        let capabilities = self.connector.initialize().await?;
        self.connector.notify_initialized().await?;
        self.initialized.store(true, Ordering::SeqCst);
        self.refresh_tools().await?;
        Ok(capabilities)
    }

    /// Check if the session is connected
    pub fn is_connected(&self) -> bool {
        self.connector.is_connected()
    }

    /// Check if the session has been initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Disconnect from the server
    pub async fn disconnect(&self) -> Result<()> {
        self.connector.disconnect().await?;
        self.initialized.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Refresh the tools cache by fetching from the server
    pub async fn refresh_tools(&self) -> Result<()> {
        let tools = self.connector.list_tools().await?;
        let mut cache = self.tools_cache.write();
        cache.clear();
        for tool in tools {
            cache.insert(tool.name.clone(), tool);
        }
        Ok(())
    }

    /// Get all cached tools, sorted by name
    pub fn get_tools(&self) -> Vec<Tool> {
        self.tools_cache.read().values().cloned().collect()
    }

    /// Get a specific tool by name
    pub fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools_cache.read().get(name).cloned()
    }

    /// Call a tool on the server
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<ToolResult> {
        self.connector.call_tool(tool_name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{JsonRpcRequest, JsonRpcResponse, ToolInputSchema};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Default)]
    struct MockConnector {
        methods: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl Connector for MockConnector {
        async fn send_request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
            self.methods.lock().push(request.method.clone());
            let result = match request.method.as_str() {
                "initialize" => json!({ "protocolVersion": "2024-11-05" }),
                "notifications/initialized" => json!({}),
                "tools/list" => json!({
                    "tools": [
                        { "name": "zeta", "inputSchema": ToolInputSchema::empty() },
                        { "name": "alpha", "description": "first" }
                    ]
                }),
                _ => json!({ "content": [{ "type": "text", "text": "ok" }] }),
            };
            Ok(JsonRpcResponse::success(request.id, result))
        }

        async fn connect(&self) -> Result<()> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<()> {
            Ok(())
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new("test", Box::new(MockConnector::default()));
        assert_eq!(session.name, "test");
        assert!(!session.is_initialized());
        assert!(session.get_tools().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_caches_tools() {
        let connector = MockConnector::default();
        let methods = Arc::clone(&connector.methods);
        let session = Session::new("test", Box::new(connector));
        session.connect().await.unwrap();
        session.initialize().await.unwrap();
        assert!(session.is_initialized());
        assert_eq!(
            *methods.lock(),
            vec!["initialize", "notifications/initialized", "tools/list"]
        );

        let names: Vec<_> = session.get_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(session.get_tool("alpha").unwrap().description.as_deref(), Some("first"));

        let result = session.call_tool("alpha", json!({})).await.unwrap();
        assert_eq!(result.text(), "ok");
    }
}
