//! HTTP connector for MCP
use super::base::Connector;
use crate::config::MCPServerConfig;
use crate::error::{Error, Result};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// HTTP-based MCP connector
pub struct HttpConnector {
    config: MCPServerConfig,
    client: Client,
    connected: AtomicBool,
}

impl HttpConnector {
    /// Create a new HTTP connector
    pub fn new(config: MCPServerConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            connected: AtomicBool::new(false),
        }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait::async_trait]
impl Connector for HttpConnector {
    async fn send_request(&self, request: JsonRpcRequest) -> Result<JsonRpcResponse> {
        if !self.is_connected() {
            return Err(Error::ConnectionError("Not connected".to_string()));
        }

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::ConnectionError(format!("{}: {}", self.config.url, e))
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::ConnectionError(format!(
                "{} answered {}",
                self.config.url,
                response.status()
            )));
        }

        response
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| Error::ConnectionError(e.to_string()))
    }

    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector() -> HttpConnector {
        HttpConnector::new(MCPServerConfig::http("stock", "http://localhost:3000"))
    }

    #[test]
    fn test_http_connector_creation() {
        let connector = connector();
        assert!(!connector.is_connected());
        assert_eq!(connector.url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_http_connector_connect() {
        let connector = connector();
        assert!(connector.connect().await.is_ok());
        assert!(connector.is_connected());
        connector.disconnect().await.unwrap();
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let err = connector()
            .send_request(JsonRpcRequest::new("ping", None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionError(_)));
    }
}
