//! Anthropic Claude adapter (Messages API with native tool use).

use crate::agent::{LLMProvider, LLMResponse, StopReason};
use crate::error::{Error, Result};
use crate::protocol::{ContentBlock, Message, Role, Tool, ToolInputSchema, ToolResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API request message
#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: Vec<AnthropicContentBlock>,
}

/// Anthropic API tool definition
#[derive(Debug, Serialize)]
struct AnthropicTool {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    input_schema: Value,
}

/// Anthropic API request
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
    temperature: f32,
}

/// Anthropic API response
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse { id: String, name: String, input: Value },
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    // thinking and other block kinds are ignored
    #[serde(other)]
    Other,
}

/// Anthropic Claude LLM Provider
pub struct AnthropicAdapter {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicAdapter {
    /// Create a new Anthropic adapter
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            client: reqwest::Client::new(),
        }
    }

    /// Set temperature for response diversity
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set max tokens for response length
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn convert_messages(messages: &[Message]) -> Vec<AnthropicMessage> {
        messages
            .iter()
            .map(|msg| AnthropicMessage {
                role: match msg.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                content: msg
                    .content
                    .iter()
                    .map(|block| match block {
                        ContentBlock::Text { text } => AnthropicContentBlock::Text { text: text.clone() },
                        ContentBlock::ToolUse { id, name, input } => AnthropicContentBlock::ToolUse {
                            id: id.clone(),
                            name: name.clone(),
                            input: input.clone(),
                        },
                        ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                            AnthropicContentBlock::ToolResult {
                                tool_use_id: tool_use_id.clone(),
                                content: ToolResult {
                                    content: content.clone(),
                                    is_error: *is_error,
                                }
                                .text(),
                                is_error: *is_error,
                            }
                        }
                    })
                    .collect(),
            })
            .filter(|m| !m.content.is_empty())
            .collect()
    }

    fn convert_tool(tool: &Tool) -> AnthropicTool {
        AnthropicTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool
                .input_schema
                .clone()
                .unwrap_or_else(ToolInputSchema::empty)
                .to_json(),
        }
    }

    fn convert_response(response: AnthropicResponse) -> LLMResponse {
        let content = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(ContentBlock::Text { text }),
                AnthropicContentBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                _ => None,
            })
            .collect();

        let stop_reason = match response.stop_reason.as_deref() {
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        };

        LLMResponse {
            content,
            stop_reason,
        }
    }
}

#[async_trait::async_trait]
impl LLMProvider for AnthropicAdapter {
    async fn call(&self, system: &str, messages: Vec<Message>, tools: Vec<Tool>) -> Result<LLMResponse> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system.to_string(),
            messages: Self::convert_messages(&messages),
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(Self::convert_tool).collect())
            },
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::ConnectionError(format!("Anthropic API error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::LLMError(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMError(format!("Failed to parse Anthropic response: {}", e)))?;

        Ok(Self::convert_response(anthropic_response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ResultContent;
    use serde_json::json;

    #[test]
    fn test_anthropic_adapter_config() {
        let adapter = AnthropicAdapter::new("sk-ant-test-key".to_string(), DEFAULT_MODEL.to_string())
            .with_temperature(0.5)
            .with_max_tokens(2000)
            .with_base_url("http://localhost:9999/");

        assert_eq!(adapter.model, DEFAULT_MODEL);
        assert_eq!(adapter.temperature, 0.5);
        assert_eq!(adapter.max_tokens, 2000);
        assert_eq!(adapter.base_url, "http://localhost:9999");
    }

    #[test]
    fn test_tool_result_block() {
        let messages = vec![Message {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: "toolu_1".to_string(),
                content: vec![ResultContent::text("Company IAM not found")],
                is_error: Some(true),
            }],
        }];
        let converted = serde_json::to_value(AnthropicAdapter::convert_messages(&messages)).unwrap();
        assert_eq!(
            converted,
            json!([{
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": "toolu_1",
                    "content": "Company IAM not found",
                    "is_error": true
                }]
            }])
        );
    }

    #[test]
    fn test_response_conversion_skips_unknown_blocks() {
        let response: AnthropicResponse = serde_json::from_value(json!({
            "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": "Let me check." },
                { "type": "tool_use", "id": "toolu_2", "name": "getStockByCompany", "input": { "companyName": "OCP" } }
            ],
            "stop_reason": "tool_use"
        }))
        .unwrap();

        let converted = AnthropicAdapter::convert_response(response);
        assert_eq!(converted.stop_reason, StopReason::ToolUse);
        assert_eq!(converted.content.len(), 2);
        assert!(matches!(&converted.content[1], ContentBlock::ToolUse { name, .. } if name == "getStockByCompany"));
    }
}
