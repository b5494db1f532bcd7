//! Stock MCP - a Model Context Protocol demo
//!
//! Tool servers expose company lookup, company listing, random stock quotes
//! and employee info over MCP; an agent discovers those tools, hands them to
//! an LLM and answers free-text questions on `GET /chat`.
//!
//! ## Modules
//! - Protocol types and structures
//! - MCP Server and the tool handlers it serves
//! - MCP Client over one or more HTTP servers
//! - AI Agent with OpenAI / Anthropic adapters
//! - REST chat endpoint
//! - Configuration from the environment (.env supported) and logging

/// Load environment variables from .env file
/// Call this in your main() function before reading settings
pub fn load_env() {
    dotenv::dotenv().ok();
}

pub mod adapters;
pub mod agent;
pub mod chat;
pub mod client;
pub mod config;
pub mod connectors;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::adapters::{AnthropicAdapter, OpenAIAdapter};
    pub use crate::agent::*;
    pub use crate::client::*;
    pub use crate::config::{AgentSettings, MCPServerConfig, ProviderKind, ToolServerSettings};
    pub use crate::error::{Error, Result};
    pub use crate::protocol::*;
    pub use crate::server::*;
}
