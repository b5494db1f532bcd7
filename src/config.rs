//! Configuration for the tool servers and the agent
//!
//! Everything is read from environment variables. Call `crate::load_env()`
//! first to pick up a `.env` file.
use crate::error::{Error, Result};
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_STOCK_SERVER_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_EMPLOYEE_SERVER_ADDR: &str = "127.0.0.1:3001";
pub const DEFAULT_AGENT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MCP_SERVERS: &str = "stock=http://127.0.0.1:3000";

/// Configuration for a single MCP server connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MCPServerConfig {
    /// Display name for this server
    pub name: String,

    /// JSON-RPC endpoint, e.g. "http://localhost:3000"
    pub url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl MCPServerConfig {
    /// Create a new HTTP/HTTPS server config
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Parse a comma-separated `name=url` list.
pub fn parse_server_list(list: &str) -> Result<Vec<MCPServerConfig>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| Error::ConfigError(format!("Expected name=url, got '{}'", entry)))?;
            let (name, url) = (name.trim(), url.trim());
            if name.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigError(format!("Invalid MCP server entry '{}'", entry)));
            }
            Ok(MCPServerConfig::http(name, url))
        })
        .collect()
}

/// Which chat-completion backend the agent talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    /// Echoes the query; no network access
    Dummy,
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "ollama" => Ok(ProviderKind::OpenAI),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "dummy" | "echo" => Ok(ProviderKind::Dummy),
            other => Err(Error::ConfigError(format!("Unknown LLM provider: {}", other))),
        }
    }
}

/// Settings of a tool server binary
#[derive(Debug, Clone)]
pub struct ToolServerSettings {
    pub addr: String,
    pub log_level: LogLevel,
}

impl ToolServerSettings {
    /// Read `addr_var` (falling back to `default_addr`) and `LOG_LEVEL`.
    pub fn from_env(addr_var: &str, default_addr: &str) -> Result<Self> {
        Self::from_lookup(addr_var, default_addr, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        addr_var: &str,
        default_addr: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            addr: lookup(addr_var).unwrap_or_else(|| default_addr.to_string()),
            log_level: lookup("LOG_LEVEL")
                .map(|l| l.parse::<LogLevel>())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

/// Settings of the agent binary
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub addr: String,
    pub servers: Vec<MCPServerConfig>,
    pub provider: ProviderKind,
    pub model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub max_iterations: usize,
    pub log_level: LogLevel,
}

impl AgentSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let servers = parse_server_list(
            &lookup("MCP_SERVERS").unwrap_or_else(|| DEFAULT_MCP_SERVERS.to_string()),
        )?;

        let max_iterations = match lookup("AGENT_MAX_ITERATIONS") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                Error::ConfigError(format!("AGENT_MAX_ITERATIONS '{}': {}", raw, e))
            })?,
            None => crate::agent::AgentConfig::default().max_iterations,
        };
        if max_iterations == 0 {
            return Err(Error::ConfigError(
                "AGENT_MAX_ITERATIONS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            addr: lookup("AGENT_ADDR").unwrap_or_else(|| DEFAULT_AGENT_ADDR.to_string()),
            servers,
            provider: lookup("LLM_PROVIDER")
                .map(|p| p.parse::<ProviderKind>())
                .transpose()?
                .unwrap_or(ProviderKind::OpenAI),
            model: lookup("LLM_MODEL"),
            openai_api_key: lookup("OPENAI_API_KEY"),
            openai_base_url: lookup("OPENAI_BASE_URL"),
            anthropic_api_key: lookup("ANTHROPIC_API_KEY"),
            max_iterations,
            log_level: lookup("LOG_LEVEL")
                .map(|l| l.parse::<LogLevel>())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}
