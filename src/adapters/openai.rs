//! OpenAI LLM Adapter using the Chat Completions API
//!
//! Tools are offered as `function` tools. When the model asks for function
//! calls they come back as `ToolUse` blocks and the agent executes them; this
//! adapter never runs tools itself.
//!
//! Any OpenAI-compatible endpoint works, e.g. a local Ollama:
//!
//! ```ignore
//! use stock_mcp::adapters::OpenAIAdapter;
//!
//! let adapter = OpenAIAdapter::new(None, "llama3.1".to_string())
//!     .with_base_url("http://localhost:11434");
//! ```

use crate::agent::{LLMProvider, LLMResponse, StopReason};
use crate::error::{Error, Result};
use crate::protocol::{ContentBlock, Message, Role, Tool, ToolInputSchema};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat Completions tool definition
#[derive(Debug, Serialize, Clone)]
struct OpenAITool {
    #[serde(rename = "type")]
    type_field: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize, Clone)]
struct OpenAIFunction {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: Value,
}

/// Chat message in either direction
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub(crate) struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
struct ChatToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    type_field: String,
    function: ChatFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// Arguments travel as a JSON-encoded string
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
struct ChatFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// OpenAI LLM Provider
pub struct OpenAIAdapter {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAIAdapter {
    /// Create a new OpenAI adapter. Local endpoints may not need a key.
    pub fn new(api_key: Option<String>, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn convert_tool(tool: &Tool) -> OpenAITool {
        let parameters = tool
            .input_schema
            .clone()
            .unwrap_or_else(ToolInputSchema::empty)
            .to_json();
        OpenAITool {
            type_field: "function".to_string(),
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters,
            },
        }
    }

    /// Flatten the conversation into Chat Completions messages.
    ///
    /// Each tool result becomes its own `tool` message.
    pub(crate) fn convert_messages(system: &str, messages: &[Message]) -> Vec<ChatMessage> {
        let mut converted = vec![ChatMessage::plain("system", system.to_string())];

        for msg in messages {
            match msg.role {
                Role::User => {
                    let text = msg.text();
                    if !text.is_empty() {
                        converted.push(ChatMessage::plain("user", text));
                    }
                    for block in &msg.content {
                        if let ContentBlock::ToolResult { tool_use_id, content, is_error } = block {
                            let result = crate::protocol::ToolResult {
                                content: content.clone(),
                                is_error: *is_error,
                            };
                            let body = if result.is_error() {
                                format!("Error: {}", result.text())
                            } else {
                                result.text()
                            };
                            converted.push(ChatMessage {
                                role: "tool".to_string(),
                                content: Some(body),
                                tool_calls: None,
                                tool_call_id: Some(tool_use_id.clone()),
                            });
                        }
                    }
                }
                Role::Assistant => {
                    let text = msg.text();
                    let tool_calls: Vec<ChatToolCall> = msg
                        .content
                        .iter()
                        .filter_map(|block| match block {
                            ContentBlock::ToolUse { id, name, input } => Some(ChatToolCall {
                                id: id.clone(),
                                type_field: function_type(),
                                function: ChatFunctionCall {
                                    name: name.clone(),
                                    arguments: input.to_string(),
                                },
                            }),
                            _ => None,
                        })
                        .collect();
                    converted.push(ChatMessage {
                        role: "assistant".to_string(),
                        content: if text.is_empty() { None } else { Some(text) },
                        tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
                        tool_call_id: None,
                    });
                }
            }
        }

        converted
    }

    /// Turn the first choice into content blocks.
    pub(crate) fn convert_response(response: ChatCompletionResponse) -> Result<LLMResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::LLMError("OpenAI response has no choices".to_string()))?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content.push(ContentBlock::Text { text });
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            let input = serde_json::from_str::<Value>(&call.function.arguments).unwrap_or_else(|e| {
                log::warn!("Unparseable arguments for '{}': {}", call.function.name, e);
                json!({})
            });
            content.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("tool_calls") => StopReason::ToolUse,
            Some("length") => StopReason::MaxTokens,
            _ if content.iter().any(|c| matches!(c, ContentBlock::ToolUse { .. })) => {
                StopReason::ToolUse
            }
            _ => StopReason::EndTurn,
        };

        Ok(LLMResponse {
            content,
            stop_reason,
        })
    }
}

#[async_trait::async_trait]
impl LLMProvider for OpenAIAdapter {
    async fn call(&self, system: &str, messages: Vec<Message>, tools: Vec<Tool>) -> Result<LLMResponse> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::convert_messages(system, &messages),
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(Self::convert_tool).collect())
            },
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::ConnectionError(format!("OpenAI API error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::LLMError(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::LLMError(format!("Failed to parse OpenAI response: {}", e)))?;

        Self::convert_response(body)
    }
}
