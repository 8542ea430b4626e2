use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use homescout_core::ExportError;
use homescout_harvest::SourceError;

/// Failure kinds a tool invocation can report.
///
/// These stay tagged inside the crate so callers can branch on them; the
/// agent runtime flattens them to text at the model boundary.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("invalid tool arguments: {0}")]
    Arguments(String),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model calls this tool by.
    fn name(&self) -> &'static str;
    /// What the tool does; the model reads this to plan calls.
    fn description(&self) -> &str;
    /// JSON Schema for the tool's arguments.
    fn input_schema(&self) -> Value;
    /// Execute with arguments matching `input_schema`, returning the text
    /// payload handed back to the model.
    async fn invoke(&self, arguments: Value) -> Result<String, ToolError>;
}

/// Tool surface advertised to the model on each request.
#[derive(Clone, Debug, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(Box::as_ref)
    }

    /// Specs for every registered tool, sorted by name so requests are
    /// deterministic.
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs = self
            .tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.input_schema(),
            })
            .collect::<Vec<_>>();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
