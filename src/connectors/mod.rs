//! Connection transport mechanisms for MCP
//!
//! - HTTP - JSON-RPC requests POSTed to the server endpoint

pub mod base;
pub mod http;

pub use base::Connector;
pub use http::HttpConnector;
