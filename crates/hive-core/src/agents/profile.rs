//! Agent record: an agent's identity, model, instructions and hand-off targets

use serde::{Deserialize, Serialize};

/// Model used when a create request does not name one
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// One conversational persona in the swarm.
///
/// Only `name`, `model` and `instructions` are persisted. `transfer_targets`
/// is derived from registry membership and rebuilt after every load or
/// insertion, so it is skipped by serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    pub model: String,
    pub instructions: String,
    #[serde(skip)]
    pub transfer_targets: Vec<String>,
}

impl AgentRecord {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instructions: instructions.into(),
            transfer_targets: Vec::new(),
        }
    }

    /// Check if this agent may hand off to `target`
    pub fn can_transfer_to(&self, target: &str) -> bool {
        self.transfer_targets.iter().any(|t| t == target)
    }
}

/// Tool name exposed to the model for handing off to `target`
pub fn transfer_tool_name(target: &str) -> String {
    format!("transfer_to_{}", target.to_lowercase().replace(' ', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_record_new() {
        let agent = AgentRecord::new("Risk_Analyst", DEFAULT_MODEL, "You analyse risk.");
        assert_eq!(agent.name, "Risk_Analyst");
        assert_eq!(agent.model, DEFAULT_MODEL);
        assert!(agent.transfer_targets.is_empty());
    }

    #[test]
    fn test_transfer_targets_not_serialized() {
        let mut agent = AgentRecord::new("A", DEFAULT_MODEL, "inst");
        agent.transfer_targets = vec!["B".to_string()];
        let json = serde_json::to_value(&agent).unwrap();
        assert!(json.get("transfer_targets").is_none());
        assert_eq!(json["name"], "A");
        assert_eq!(json["instructions"], "inst");
    }

    #[test]
    fn test_can_transfer_to() {
        let mut agent = AgentRecord::new("A", DEFAULT_MODEL, "inst");
        agent.transfer_targets = vec!["B".to_string()];
        assert!(agent.can_transfer_to("B"));
        assert!(!agent.can_transfer_to("A"));
    }

    #[test]
    fn test_transfer_tool_name() {
        assert_eq!(transfer_tool_name("Risk_Analyst"), "transfer_to_risk_analyst");
        assert_eq!(transfer_tool_name("Data Analyst"), "transfer_to_data_analyst");
    }
}
