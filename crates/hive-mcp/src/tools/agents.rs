//! Agent management tools

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use hive_core::Hive;

use super::{ToolHandler, ToolOutput, json_schema, optional_str, truncate};

const INSTRUCTIONS_PREVIEW_CHARS: usize = 80;

/// Register a new agent with the swarm
pub struct CreateAgentTool {
    /// Advertised as the schema default for `model`
    default_model: String,
}

impl CreateAgentTool {
    pub fn new(default_model: impl Into<String>) -> Self {
        Self {
            default_model: default_model.into(),
        }
    }
}

#[async_trait]
impl ToolHandler for CreateAgentTool {
    fn name(&self) -> &str {
        "create_agent"
    }

    fn description(&self) -> &str {
        "Create a new Swarm agent with transfer capabilities"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            json!({
                "name": {
                    "type": "string",
                    "description": "Agent name"
                },
                "instructions": {
                    "type": "string",
                    "description": "Agent instructions (include transfer conditions)"
                },
                "model": {
                    "type": "string",
                    "default": self.default_model
                }
            }),
            vec!["name", "instructions"],
        )
    }

    async fn execute(&self, hive: &mut Hive, input: Value) -> Result<ToolOutput> {
        let name = optional_str(&input, "name")?.unwrap_or_default();
        let instructions = optional_str(&input, "instructions")?.unwrap_or_default();
        let model = optional_str(&input, "model")?;

        match hive.create_agent(name, instructions, model) {
            Ok(agent) => Ok(ToolOutput::success(format!(
                "✅ Created Swarm agent '{}' with transfer capabilities!",
                agent.name
            ))),
            Err(e) => {
                debug!("create_agent rejected: {}", e);
                Ok(ToolOutput::failure(e))
            }
        }
    }
}

/// Show every registered agent with its transfer count
pub struct ListAgentsTool;

#[async_trait]
impl ToolHandler for ListAgentsTool {
    fn name(&self) -> &str {
        "list_agents"
    }

    fn description(&self) -> &str {
        "List all Swarm agents and their transfer functions"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, hive: &mut Hive, _input: Value) -> Result<ToolOutput> {
        Ok(ToolOutput::success(render_agent_list(hive)))
    }
}

fn render_agent_list(hive: &Hive) -> String {
    let agents = hive.registry().list();
    if agents.is_empty() {
        return "📝 No Swarm agents found.".to_string();
    }

    let mut out = format!("🔄 **Swarm Agents** ({} total):\n\n", agents.len());
    for agent in agents {
        let marker = if hive.active_agent() == Some(agent.name.as_str()) {
            "▶️"
        } else {
            "🤖"
        };
        out.push_str(&format!(
            "{} **{}** ({} transfer functions)\n",
            marker,
            agent.name,
            agent.transfer_targets.len()
        ));
        out.push_str(&format!(
            "   Instructions: {}\n\n",
            truncate(&agent.instructions, INSTRUCTIONS_PREVIEW_CHARS)
        ));
    }
    out
}
