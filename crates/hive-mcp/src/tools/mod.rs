//! Tool router and the swarm tool handlers

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use hive_core::Hive;

use crate::protocol::ToolInfo;

pub mod agents;
pub mod chat;
pub mod team;

/// Leading marker of every failure text
pub const FAILURE_MARKER: &str = "❌";

/// Text result of a tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    /// Failure text, prefixed with the failure marker
    pub fn failure(message: impl std::fmt::Display) -> Self {
        Self {
            text: format!("{} {}", FAILURE_MARKER, message),
            is_error: true,
        }
    }
}

/// Individual tool handler.
///
/// Expected failures (bad input, duplicates, runner errors) are returned as
/// `Ok(ToolOutput::failure(..))`. An `Err` means something unexpected and is
/// reported by the router as an error in that tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    async fn execute(&self, hive: &mut Hive, input: Value) -> Result<ToolOutput>;
}

/// Fixed table of tools, listed in registration order
pub struct ToolRouter {
    tools: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Router with the five swarm tools. `default_model` is the model
    /// advertised for agents created without one.
    pub fn with_swarm_tools(default_model: &str) -> Self {
        let mut router = Self::new();
        router.register(Arc::new(agents::CreateAgentTool::new(default_model)));
        router.register(Arc::new(chat::ChatWithSwarmTool));
        router.register(Arc::new(team::CreateFinanceTeamTool));
        router.register(Arc::new(chat::ConversationHistoryTool));
        router.register(Arc::new(agents::ListAgentsTool));
        router
    }

    /// Register a tool handler, replacing any tool with the same name
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        debug!("Registering tool: {}", handler.name());
        self.tools.retain(|t| t.name() != handler.name());
        self.tools.push(handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|handler| ToolInfo {
                name: handler.name().to_string(),
                description: handler.description().to_string(),
                input_schema: handler.input_schema(),
            })
            .collect()
    }

    /// Run `tool_name` against the hive. Never fails: unknown tools and
    /// handler errors come back as failure text.
    pub async fn dispatch(&self, hive: &mut Hive, tool_name: &str, input: Value) -> ToolOutput {
        debug!("Dispatching tool: {} with input: {:?}", tool_name, input);

        let Some(handler) = self.get(tool_name) else {
            warn!("Unknown tool requested: {}", tool_name);
            return ToolOutput::failure(format!("Unknown tool: {}", tool_name));
        };

        match handler.execute(hive, input).await {
            Ok(output) => {
                debug!("Tool {} finished (error: {})", tool_name, output.is_error);
                output
            }
            Err(e) => {
                warn!("Tool {} failed: {:#}", tool_name, e);
                ToolOutput::failure(format!("Error in {}: {}", tool_name, e))
            }
        }
    }
}

impl Default for ToolRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create a JSON schema for tool input
pub fn json_schema(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Optional string argument. Missing and `null` are `None`; any other
/// non-string type is an error.
pub fn optional_str<'a>(input: &'a Value, key: &str) -> Result<Option<&'a str>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(anyhow!("'{}' must be a string, got {}", key, other)),
    }
}

/// Truncate to `max` characters, appending "..." when anything was cut
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
