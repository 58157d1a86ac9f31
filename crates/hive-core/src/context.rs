//! System prompt building for a swarm turn

use tracing::debug;

use crate::agents::AgentRecord;
use crate::types::ContextValues;

/// Build the system prompt for `agent` from its instructions and the shared
/// context values
pub fn build_system_prompt(agent: &AgentRecord, context: &ContextValues) -> String {
    let mut prompt = String::new();

    prompt.push_str(&agent.instructions);
    prompt.push_str("\n\n");

    if !context.is_empty() {
        prompt.push_str("# CONTEXT\n\n");
        for (key, value) in context {
            match value {
                serde_json::Value::String(s) => prompt.push_str(&format!("- {}: {}\n", key, s)),
                other => prompt.push_str(&format!("- {}: {}\n", key, other)),
            }
        }
        prompt.push('\n');
    }

    if !agent.transfer_targets.is_empty() {
        prompt.push_str("# TEAM\n\n");
        prompt.push_str("You can hand the conversation to: ");
        prompt.push_str(&agent.transfer_targets.join(", "));
        prompt.push_str(". Use the matching transfer tool when another agent is better suited.\n");
    }

    debug!("Built system prompt for {} ({} chars)", agent.name, prompt.len());

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::DEFAULT_MODEL;
    use serde_json::json;

    #[test]
    fn test_prompt_starts_with_instructions() {
        let agent = AgentRecord::new("A", DEFAULT_MODEL, "You are a risk analyst.");
        let prompt = build_system_prompt(&agent, &ContextValues::new());
        assert!(prompt.starts_with("You are a risk analyst."));
        assert!(!prompt.contains("# CONTEXT"));
        assert!(!prompt.contains("# TEAM"));
    }

    #[test]
    fn test_prompt_lists_context_and_team() {
        let mut agent = AgentRecord::new("A", DEFAULT_MODEL, "inst");
        agent.transfer_targets = vec!["B".to_string(), "C".to_string()];
        let mut context = ContextValues::new();
        context.insert("client".into(), json!("Acme"));
        context.insert("budget".into(), json!(5000));

        let prompt = build_system_prompt(&agent, &context);
        assert!(prompt.contains("- client: Acme"));
        assert!(prompt.contains("- budget: 5000"));
        assert!(prompt.contains("B, C"));
        assert!(prompt.find("# CONTEXT").unwrap() < prompt.find("# TEAM").unwrap());
    }
}
