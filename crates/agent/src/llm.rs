use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use homescout_core::config::{LlmConfig, LlmProvider};

use crate::tools::ToolSpec;

/// One turn of chat context as the runtime tracks it.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatMessage {
    System { content: String },
    User { content: String },
    Assistant { content: Option<String>, tool_calls: Vec<ToolCallRequest> },
    ToolResult { call_id: String, content: String },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System { content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User { content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant { content: Some(content.into()), tool_calls: Vec::new() }
    }
}

/// A tool invocation the model asked for.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// What the model produced for one request: text, tool calls, or both.
#[derive(Clone, Debug, Default)]
pub struct LlmReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl LlmReply {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("could not build llm client: {0}")]
    Client(String),
    #[error("llm request failed: {0}")]
    Request(String),
    #[error("llm endpoint returned status {0}")]
    Status(u16),
    #[error("could not decode llm response: {0}")]
    Decode(String),
    #[error("llm reply contained no choices")]
    EmptyReply,
}

impl LlmError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// Abstraction over chat completion that the agent runtime uses.
/// Decouples the per-message loop from any specific provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<LlmReply, LlmError>;
}

/// Chat-completions client for OpenAI-compatible endpoints (OpenAI,
/// Anthropic's compatibility surface, Ollama).
pub struct OpenAiChatClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    max_retries: u32,
}

impl OpenAiChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(config.provider).to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| LlmError::Client(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn send(&self, url: &str, body: &WireRequest<'_>) -> Result<LlmReply, LlmError> {
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|err| LlmError::Request(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let decoded: WireResponse =
            response.json().await.map_err(|err| LlmError::Decode(err.to_string()))?;
        let choice = decoded.choices.into_iter().next().ok_or(LlmError::EmptyReply)?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: parse_arguments(&call.function.arguments),
            })
            .collect();

        Ok(LlmReply { text: choice.message.content, tool_calls })
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<LlmReply, LlmError> {
        let body = WireRequest {
            model: &self.model,
            messages: wire_messages(messages),
            tools: tools.iter().map(WireTool::function).collect(),
            temperature: 0.0,
        };
        let url = format!("{}/chat/completions", self.base_url);

        let mut attempt: u32 = 0;
        loop {
            match self.send(&url, &body).await {
                Ok(reply) => return Ok(reply),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    attempt += 1;
                    tracing::warn!(
                        event_name = "llm.chat.retry",
                        attempt,
                        error = %err,
                        "retrying llm request"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn default_base_url(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::OpenAi => "https://api.openai.com/v1",
        LlmProvider::Anthropic => "https://api.anthropic.com/v1",
        LlmProvider::Ollama => "http://localhost:11434/v1",
    }
}

/// Model-produced arguments arrive as a JSON string. A malformed string is
/// kept verbatim so the receiving tool rejects it with a message the model
/// can read and correct.
fn parse_arguments(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage> {
    messages
        .iter()
        .map(|message| match message {
            ChatMessage::System { content } => WireMessage {
                role: "system",
                content: Some(content.clone()),
                ..WireMessage::default()
            },
            ChatMessage::User { content } => WireMessage {
                role: "user",
                content: Some(content.clone()),
                ..WireMessage::default()
            },
            ChatMessage::Assistant { content, tool_calls } => WireMessage {
                role: "assistant",
                content: content.clone(),
                tool_calls: tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        id: call.id.clone(),
                        kind: "function".to_string(),
                        function: WireFunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.to_string(),
                        },
                    })
                    .collect(),
                ..WireMessage::default()
            },
            ChatMessage::ToolResult { call_id, content } => WireMessage {
                role: "tool",
                content: Some(content.clone()),
                tool_call_id: Some(call_id.clone()),
                ..WireMessage::default()
            },
        })
        .collect()
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolSpec,
}

impl<'a> WireTool<'a> {
    fn function(spec: &'a ToolSpec) -> Self {
        Self { kind: "function", function: spec }
    }
}

#[derive(Default, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Deserialize, Serialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Deserialize, Serialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}
