//! Agent integration - LLM-driven tool calling over the listing pipeline
//!
//! This crate wires the core search pipeline to a chat model:
//! - **Tools** (`tools`) - the `Tool` trait, argument schemas, and the registry
//!   handed to the model on every request
//! - **Home search** (`home_search`) - the one tool this assistant exposes:
//!   query the property source once, optionally export, filter, cap, format
//! - **LLM boundary** (`llm`) - `LlmClient` trait plus an OpenAI-compatible
//!   chat-completions client
//! - **Runtime** (`runtime`) - the per-message loop with a rolling history
//!   window
//!
//! # Error posture
//!
//! Tools report failures as tagged `ToolError` values. The runtime is the
//! integration boundary: it flattens a failed tool call to the error's string
//! form and hands that to the model as the observation, so one bad upstream
//! call never ends the conversation. The model decides how to react.

pub mod home_search;
pub mod llm;
pub mod runtime;
pub mod tools;

pub use home_search::{HomeSearchArgs, HomeSearchTool, HOME_SEARCH_TOOL_NAME};
pub use llm::{ChatMessage, LlmClient, LlmError, LlmReply, OpenAiChatClient, ToolCallRequest};
pub use runtime::{AgentError, AgentRuntime};
pub use tools::{Tool, ToolError, ToolRegistry, ToolSpec};
