use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use homescout_core::config::AgentConfig;

use crate::llm::{ChatMessage, LlmClient, LlmError, ToolCallRequest};
use crate::tools::{ToolError, ToolRegistry};

const DEFAULT_SYSTEM_PROMPT: &str = "You are a real-estate search assistant. \
Use the home_search tool to look up listings whenever the user asks about \
properties, prices, or availability in a location. Summarize tool results \
conversationally; do not invent listings the tool did not return. If a tool \
call reports an error, explain the problem briefly and suggest what the user \
could change.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("no final reply after {0} agent steps")]
    StepLimit(usize),
}

/// Per-message orchestration loop.
///
/// Holds the rolling window of past exchanges and drives the model until it
/// produces a text-only reply. Failed tool calls are not fatal: the error's
/// string form becomes the observation and the model reacts to it.
pub struct AgentRuntime {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    system_prompt: String,
    history_window: usize,
    max_steps: usize,
    history: Mutex<VecDeque<Exchange>>,
}

#[derive(Clone, Debug)]
struct Exchange {
    user: String,
    assistant: String,
}

impl AgentRuntime {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, config: &AgentConfig) -> Self {
        Self {
            llm,
            tools,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_window: config.history_window,
            max_steps: config.max_steps,
            history: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub async fn handle_message(&self, text: &str) -> Result<String, AgentError> {
        let correlation_id = uuid::Uuid::new_v4();
        let specs = self.tools.specs();
        let mut messages = self.seed_messages(text);

        for step in 0..self.max_steps {
            let reply = self.llm.chat(&messages, &specs).await?;

            if !reply.has_tool_calls() {
                let answer = reply.text.unwrap_or_default();
                self.remember(text, &answer);
                tracing::info!(
                    event_name = "agent.turn.completed",
                    correlation_id = %correlation_id,
                    steps = step + 1,
                    "assistant reply ready"
                );
                return Ok(answer);
            }

            messages.push(ChatMessage::Assistant {
                content: reply.text.clone(),
                tool_calls: reply.tool_calls.clone(),
            });
            for call in reply.tool_calls {
                let observation = self.observe(&call, correlation_id).await;
                messages.push(ChatMessage::ToolResult { call_id: call.id, content: observation });
            }
        }

        Err(AgentError::StepLimit(self.max_steps))
    }

    async fn observe(&self, call: &ToolCallRequest, correlation_id: uuid::Uuid) -> String {
        let Some(tool) = self.tools.get(&call.name) else {
            return ToolError::UnknownTool(call.name.clone()).to_string();
        };

        match tool.invoke(call.arguments.clone()).await {
            Ok(text) => {
                tracing::info!(
                    event_name = "agent.tool.succeeded",
                    correlation_id = %correlation_id,
                    tool = call.name.as_str(),
                    "tool call succeeded"
                );
                text
            }
            Err(err) => {
                tracing::warn!(
                    event_name = "agent.tool.failed",
                    correlation_id = %correlation_id,
                    tool = call.name.as_str(),
                    error = %err,
                    "tool call failed; passing the error text to the model"
                );
                err.to_string()
            }
        }
    }

    fn seed_messages(&self, text: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.system_prompt.clone())];
        if let Ok(history) = self.history.lock() {
            for exchange in history.iter() {
                messages.push(ChatMessage::user(exchange.user.clone()));
                messages.push(ChatMessage::assistant(exchange.assistant.clone()));
            }
        }
        messages.push(ChatMessage::user(text));
        messages
    }

    fn remember(&self, user: &str, assistant: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push_back(Exchange { user: user.to_string(), assistant: assistant.to_string() });
            while history.len() > self.history_window {
                history.pop_front();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use homescout_core::config::AgentConfig;

    use super::{AgentError, AgentRuntime};
    use crate::llm::{ChatMessage, LlmClient, LlmError, LlmReply, ToolCallRequest};
    use crate::tools::{Tool, ToolError, ToolRegistry, ToolSpec};

    /// Scripted client in place of a live model: pops replies in order and
    /// records every message list it was shown.
    struct ScriptedLlm {
        replies: Mutex<Vec<LlmReply>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<LlmReply>) -> Self {
            Self { replies: Mutex::new(replies), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat(
            &self,
            messages: &[ChatMessage],
            _tools: &[ToolSpec],
        ) -> Result<LlmReply, LlmError> {
            self.seen.lock().expect("seen lock").push(messages.to_vec());
            let mut replies = self.replies.lock().expect("replies lock");
            if replies.is_empty() {
                Ok(LlmReply { text: Some("out of script".to_string()), tool_calls: Vec::new() })
            } else {
                Ok(replies.remove(0))
            }
        }
    }

    fn text_reply(text: &str) -> LlmReply {
        LlmReply { text: Some(text.to_string()), tool_calls: Vec::new() }
    }

    fn tool_reply(name: &str, arguments: Value) -> LlmReply {
        LlmReply {
            text: None,
            tool_calls: vec![ToolCallRequest {
                id: "call-1".to_string(),
                name: name.to_string(),
                arguments,
            }],
        }
    }

    struct ProbeTool {
        invocations: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for ProbeTool {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn description(&self) -> &str {
            "test probe"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn invoke(&self, _arguments: Value) -> Result<String, ToolError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok("probe-result".to_string())
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn invoke(&self, _arguments: Value) -> Result<String, ToolError> {
            Err(ToolError::Arguments("bad input".to_string()))
        }
    }

    fn config(history_window: usize, max_steps: usize) -> AgentConfig {
        AgentConfig { history_window, max_steps }
    }

    fn runtime_with(
        llm: Arc<ScriptedLlm>,
        tools: ToolRegistry,
        agent_config: AgentConfig,
    ) -> AgentRuntime {
        AgentRuntime::new(llm, tools, &agent_config)
    }

    #[tokio::test]
    async fn tool_call_then_final_text() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let mut tools = ToolRegistry::default();
        tools.register(ProbeTool { invocations: invocations.clone() });

        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_reply("probe", json!({})),
            text_reply("all done"),
        ]));
        let runtime = runtime_with(llm.clone(), tools, config(5, 4));

        let answer = runtime.handle_message("run the probe").await.expect("turn should complete");
        assert_eq!(answer, "all done");
        assert_eq!(invocations.load(Ordering::SeqCst), 1);

        let seen = llm.seen.lock().expect("seen lock");
        assert_eq!(seen.len(), 2);
        let observation = seen[1].last().expect("observation message");
        assert_eq!(
            observation,
            &ChatMessage::ToolResult {
                call_id: "call-1".to_string(),
                content: "probe-result".to_string()
            }
        );
    }

    #[tokio::test]
    async fn failed_tool_calls_become_error_text_observations() {
        let mut tools = ToolRegistry::default();
        tools.register(BrokenTool);

        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_reply("broken", json!({})),
            text_reply("sorry about that"),
        ]));
        let runtime = runtime_with(llm.clone(), tools, config(5, 4));

        let answer = runtime.handle_message("break").await.expect("turn should still complete");
        assert_eq!(answer, "sorry about that");

        let seen = llm.seen.lock().expect("seen lock");
        let observation = seen[1].last().expect("observation message");
        match observation {
            ChatMessage::ToolResult { content, .. } => {
                assert_eq!(content, "invalid tool arguments: bad input");
            }
            other => panic!("expected a tool observation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_names_are_reported_not_fatal() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_reply("missing_tool", json!({})),
            text_reply("recovered"),
        ]));
        let runtime = runtime_with(llm.clone(), ToolRegistry::default(), config(5, 4));

        let answer = runtime.handle_message("hi").await.expect("turn should complete");
        assert_eq!(answer, "recovered");

        let seen = llm.seen.lock().expect("seen lock");
        match seen[1].last().expect("observation message") {
            ChatMessage::ToolResult { content, .. } => {
                assert_eq!(content, "unknown tool `missing_tool`");
            }
            other => panic!("expected a tool observation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn step_limit_is_enforced() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_reply("missing_tool", json!({})),
            tool_reply("missing_tool", json!({})),
        ]));
        let runtime = runtime_with(llm, ToolRegistry::default(), config(5, 2));

        let err = runtime.handle_message("loop forever").await.expect_err("should hit the limit");
        assert!(matches!(err, AgentError::StepLimit(2)));
    }

    #[tokio::test]
    async fn history_window_keeps_only_recent_exchanges() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            text_reply("reply one"),
            text_reply("reply two"),
            text_reply("reply three"),
        ]));
        let runtime = runtime_with(llm, ToolRegistry::default(), config(2, 4));

        for prompt in ["first", "second", "third"] {
            runtime.handle_message(prompt).await.expect("turn should complete");
        }

        let history = runtime.history.lock().expect("history lock");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user, "second");
        assert_eq!(history[1].user, "third");
        assert_eq!(history[1].assistant, "reply three");
    }

    #[tokio::test]
    async fn past_exchanges_are_replayed_before_the_new_message() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            text_reply("the first answer"),
            text_reply("the second answer"),
        ]));
        let runtime = runtime_with(llm.clone(), ToolRegistry::default(), config(5, 4));

        runtime.handle_message("question one").await.expect("first turn");
        runtime.handle_message("question two").await.expect("second turn");

        let seen = llm.seen.lock().expect("seen lock");
        let second_request = &seen[1];
        assert_eq!(second_request.len(), 4);
        assert_eq!(second_request[1], ChatMessage::user("question one"));
        assert_eq!(second_request[2], ChatMessage::assistant("the first answer"));
        assert_eq!(second_request[3], ChatMessage::user("question two"));
    }
}
