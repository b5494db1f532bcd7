use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Company {0} not found")]
    CompanyNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("LLM error: {0}")]
    LLMError(String),
}

impl Error {
    pub fn error_code(&self) -> i64 {
        match self {
            Error::ParseError(_) => -32700,
            Error::InvalidRequest(_) => -32600,
            Error::InvalidParams(_) => -32602,
            Error::MethodNotFound(_) => -32601,
            Error::InternalError(_) => -32603,
            Error::ServerError(_) => -32000,
            Error::ToolNotFound(_) => -32001,
            Error::CompanyNotFound(_) => -32002,
            Error::SerializationError(_) => -32603,
            Error::ConfigError(_) => -32603,
            Error::Timeout => -32604,
            Error::ConnectionError(_) => -32605,
            Error::LLMError(_) => -32606,
        }
    }

    /// Whether the failure happened in a collaborator (model provider or a
    /// tool server) rather than in this process.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::ConnectionError(_) | Error::LLMError(_) | Error::ServerError(_) | Error::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_not_found_message() {
        let err = Error::CompanyNotFound("Acme".to_string());
        assert_eq!(err.to_string(), "Company Acme not found");
        assert_eq!(err.error_code(), -32002);
    }

    #[test]
    fn test_upstream_classification() {
        assert!(Error::LLMError("quota".to_string()).is_upstream());
        assert!(Error::Timeout.is_upstream());
        assert!(!Error::ToolNotFound("x".to_string()).is_upstream());
    }
}
