use crate::client::McpClient;
use crate::error::{Error, Result};
use crate::protocol::*;
use std::sync::Arc;

/// Instruction given to the model with every query
pub const DEFAULT_SYSTEM_PROMPT: &str = "Answer the user question using provided tools";

/// LLM interface trait
#[async_trait::async_trait]
pub trait LLMProvider: Send + Sync {
    /// Call the LLM with a system prompt, the conversation so far and the
    /// tools it may request.
    async fn call(&self, system: &str, messages: Vec<Message>, tools: Vec<Tool>)
        -> Result<LLMResponse>;
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
}

impl LLMResponse {
    /// Plain text answer that ends the turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text { text: text.into() }],
            stop_reason: StopReason::EndTurn,
        }
    }
}

/// Reason the LLM stopped generating
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
}

/// Agentic loop configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub max_iterations: usize,
    pub system_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// MCP-powered AI Agent
///
/// Each call to [`Agent::ask`] runs its own conversation, so one agent can
/// serve concurrent requests.
pub struct Agent {
    client: McpClient,
    llm: Arc<dyn LLMProvider>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(client: McpClient, llm: Arc<dyn LLMProvider>, config: AgentConfig) -> Self {
        Self {
            client,
            llm,
            config,
        }
    }

    pub fn client(&self) -> &McpClient {
        &self.client
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Answer `query`, letting the model call tools as often as it needs.
    pub async fn ask(&self, query: impl Into<String>) -> Result<String> {
        let tools = self.client.list_tools().await?;
        let mut conversation = vec![Message::user(query)];

        for iteration in 1..=self.config.max_iterations {
            let llm_response = self
                .llm
                .call(&self.config.system_prompt, conversation.clone(), tools.clone())
                .await
                .map_err(|e| match e {
                    Error::LLMError(_) | Error::ConnectionError(_) | Error::Timeout => e,
                    other => Error::LLMError(other.to_string()),
                })?;

            let tool_uses: Vec<(String, String, serde_json::Value)> = llm_response
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();

            let answer = Message {
                role: Role::Assistant,
                content: llm_response.content,
            };

            if tool_uses.is_empty() {
                if llm_response.stop_reason == StopReason::MaxTokens {
                    log::warn!("Answer truncated by the model's token limit");
                }
                return Ok(answer.text());
            }

            log::debug!("Iteration {}: {} tool call(s)", iteration, tool_uses.len());
            conversation.push(answer);

            let mut results = Vec::with_capacity(tool_uses.len());
            for (id, name, input) in tool_uses {
                results.push(self.run_tool(id, &name, input).await?);
            }
            conversation.push(Message {
                role: Role::User,
                content: results,
            });
        }

        Err(Error::InternalError(format!(
            "Max iterations reached ({})",
            self.config.max_iterations
        )))
    }

    /// Execute one requested tool call. Tool-side failures are handed back to
    /// the model as error results; transport failures abort the query.
    async fn run_tool(&self, id: String, name: &str, input: serde_json::Value) -> Result<ContentBlock> {
        log::info!("Model requested tool '{}' with {}", name, input);

        let (content, is_error) = match self.client.call_tool(name, input).await {
            Ok(result) => {
                let is_error = result.is_error();
                (result.content, is_error)
            }
            Err(e @ (Error::ToolNotFound(_) | Error::ServerError(_))) => {
                log::warn!("Tool '{}' rejected: {}", name, e);
                (vec![ResultContent::text(e.to_string())], true)
            }
            Err(e) => return Err(e),
        };

        Ok(ContentBlock::ToolResult {
            tool_use_id: id,
            content,
            is_error: is_error.then_some(true),
        })
    }
}

/// LLM provider that answers without a model (offline runs and tests)
pub struct DummyLLMProvider;

#[async_trait::async_trait]
impl LLMProvider for DummyLLMProvider {
    async fn call(
        &self,
        _system: &str,
        messages: Vec<Message>,
        _tools: Vec<Tool>,
    ) -> Result<LLMResponse> {
        // Echo back the last user message
        let last_user_msg = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(Message::text)
            .unwrap_or_default();

        Ok(LLMResponse::text(format!("I received: {}", last_user_msg)))
    }
}
