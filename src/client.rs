//! MCP Client for communicating with one or more MCP servers.
//!
//! Tools from every configured server are aggregated into a single list and
//! each tool call is routed to the server that advertised the tool.

use crate::config::MCPServerConfig;
use crate::connectors::http::HttpConnector;
use crate::error::{Error, Result};
use crate::protocol::*;
use crate::session::Session;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// MCP Client over a set of named servers.
#[derive(Clone, Default)]
pub struct McpClient {
    servers_config: Vec<MCPServerConfig>,
    sessions: Arc<DashMap<String, Arc<Session>>>,
    // tool name -> server name
    tool_index: Arc<RwLock<HashMap<String, String>>>,
}

impl McpClient {
    /// Create a client for the given servers. Nothing is contacted yet.
    pub fn new(servers: Vec<MCPServerConfig>) -> Self {
        Self {
            servers_config: servers,
            ..Self::default()
        }
    }

    /// Add a server configuration. A server with the same name is replaced.
    pub fn add_server(&mut self, config: MCPServerConfig) {
        self.servers_config.retain(|c| c.name != config.name);
        self.servers_config.push(config);
    }

    pub fn server_names(&self) -> Vec<String> {
        self.servers_config.iter().map(|c| c.name.clone()).collect()
    }

    async fn create_session(config: &MCPServerConfig) -> Result<Session> {
        let connector = HttpConnector::new(config.clone());
        let session = Session::new(config.name.clone(), Box::new(connector));
        session.connect().await?;
        session.initialize().await?;
        Ok(session)
    }

    /// Existing session for `config`, or a freshly initialized one.
    async fn ensure_session(&self, config: &MCPServerConfig) -> Result<Arc<Session>> {
        let existing = self.sessions.get(&config.name).map(|s| Arc::clone(s.value()));
        if let Some(session) = existing {
            return Ok(session);
        }

        let session = Arc::new(Self::create_session(config).await?);
        tracing::info!("Connected to MCP server '{}' at {}", config.name, config.url);
        self.sessions.insert(config.name.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Connect every configured server. Servers that fail are logged and
    /// retried on the next `list_tools`.
    pub async fn connect_all(&self) -> Result<()> {
        let mut errors = Vec::new();

        for config in &self.servers_config {
            if let Err(e) = self.ensure_session(config).await {
                tracing::warn!("Failed to create session for '{}': {}", config.name, e);
                errors.push(format!("{}: {}", config.name, e));
            }
        }

        if !errors.is_empty() {
            tracing::warn!("Some servers failed to connect: {}", errors.join("; "));
        }

        Ok(())
    }

    /// Tools of every reachable server, in server order then name order.
    ///
    /// When two servers advertise the same tool name the first configured
    /// server keeps it.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let mut all_tools = Vec::new();
        let mut index: HashMap<String, String> = HashMap::new();
        let mut reachable = 0;

        for config in &self.servers_config {
            let session = match self.ensure_session(config).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!("MCP server '{}' unavailable: {}", config.name, e);
                    continue;
                }
            };

            if let Err(e) = session.refresh_tools().await {
                tracing::warn!("Failed to list tools from '{}': {}", config.name, e);
                self.sessions.remove(&config.name);
                continue;
            }
            reachable += 1;

            for tool in session.get_tools() {
                if let Some(owner) = index.get(&tool.name) {
                    tracing::warn!(
                        "Tool '{}' of '{}' shadowed by '{}'",
                        tool.name,
                        config.name,
                        owner
                    );
                    continue;
                }
                index.insert(tool.name.clone(), config.name.clone());
                all_tools.push(tool);
            }
        }

        *self.tool_index.write() = index;

        if reachable == 0 && !self.servers_config.is_empty() {
            return Err(Error::ConnectionError("No MCP server reachable".to_string()));
        }

        Ok(all_tools)
    }

    /// Name of the server that advertised `tool_name`, as of the last listing.
    pub fn server_for_tool(&self, tool_name: &str) -> Option<String> {
        self.tool_index.read().get(tool_name).cloned()
    }

    /// Call a tool on whichever server advertised it.
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<ToolResult> {
        let server_name = match self.server_for_tool(tool_name) {
            Some(name) => name,
            None => {
                self.list_tools().await?;
                self.server_for_tool(tool_name)
                    .ok_or_else(|| Error::ToolNotFound(tool_name.to_string()))?
            }
        };

        let config = self
            .servers_config
            .iter()
            .find(|c| c.name == server_name)
            .ok_or_else(|| Error::ServerError(format!("Unknown server '{}'", server_name)))?;

        let session = self.ensure_session(config).await?;
        tracing::debug!("Calling '{}' on '{}'", tool_name, server_name);
        session.call_tool(tool_name, arguments).await
    }

    pub async fn close_session(&self, server_name: &str) -> Result<()> {
        if let Some((_, session)) = self.sessions.remove(server_name) {
            session.disconnect().await?;
            tracing::info!("Closed session for server '{}'", server_name);
        }
        Ok(())
    }

    pub async fn close_all_sessions(&self) -> Result<()> {
        let server_names: Vec<_> = self.sessions.iter().map(|r| r.key().clone()).collect();
        for name in server_names {
            self.close_session(&name).await.ok();
        }
        self.tool_index.write().clear();
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        !self.sessions.is_empty()
    }
}
