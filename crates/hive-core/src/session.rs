//! Session state: the active agent, the transcript and shared context values

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agents::AgentRegistry;
use crate::types::{ContextValues, Message};

/// Conversation state shared by every chat request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub active_agent: Option<String>,
    pub transcript: Vec<Message>,
    pub context: ContextValues,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the first registered agent if nothing is active yet
    pub fn ensure_active(&mut self, registry: &AgentRegistry) {
        if self.active_agent.is_none() {
            if let Some(first) = registry.first() {
                debug!("Active agent defaulted to '{}'", first.name);
                self.active_agent = Some(first.name.clone());
            }
        }
    }

    /// Commit the outcome of an exchange in one step.
    ///
    /// The transcript and active agent are replaced; context values are
    /// merged with incoming keys winning.
    pub fn commit(&mut self, transcript: Vec<Message>, active_agent: String, context: ContextValues) {
        self.transcript = transcript;
        self.active_agent = Some(active_agent);
        self.merge_context(context);
    }

    pub fn merge_context(&mut self, context: ContextValues) {
        for (key, value) in context {
            self.context.insert(key, value);
        }
    }

    /// The last `n` transcript entries, oldest first
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.transcript.len().saturating_sub(n);
        &self.transcript[start..]
    }

    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_is_empty() {
        let session = SessionState::new();
        assert!(session.active_agent.is_none());
        assert!(session.transcript.is_empty());
        assert!(session.context.is_empty());
    }

    #[test]
    fn test_ensure_active_picks_first() {
        let mut registry = AgentRegistry::new();
        let mut session = SessionState::new();

        session.ensure_active(&registry);
        assert!(session.active_agent.is_none());

        registry.create("A", "inst", None).unwrap();
        registry.create("B", "inst", None).unwrap();
        session.ensure_active(&registry);
        assert_eq!(session.active_agent.as_deref(), Some("A"));
    }

    #[test]
    fn test_ensure_active_keeps_existing_choice() {
        let mut registry = AgentRegistry::new();
        registry.create("A", "inst", None).unwrap();
        let mut session = SessionState {
            active_agent: Some("B".to_string()),
            ..Default::default()
        };
        session.ensure_active(&registry);
        assert_eq!(session.active_agent.as_deref(), Some("B"));
    }

    #[test]
    fn test_commit_merges_context() {
        let mut session = SessionState::new();
        session.context.insert("portfolio".into(), json!("growth"));
        session.context.insert("risk".into(), json!("low"));

        let mut incoming = ContextValues::new();
        incoming.insert("risk".into(), json!("high"));
        incoming.insert("horizon".into(), json!(10));

        session.commit(vec![Message::user("hi")], "B".to_string(), incoming);

        assert_eq!(session.active_agent.as_deref(), Some("B"));
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.context["portfolio"], json!("growth"));
        assert_eq!(session.context["risk"], json!("high"));
        assert_eq!(session.context["horizon"], json!(10));
    }

    #[test]
    fn test_recent() {
        let mut session = SessionState::new();
        for i in 0..7 {
            session.transcript.push(Message::user(format!("m{}", i)));
        }
        let recent = session.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].content, "m2");
        assert_eq!(recent[4].content, "m6");
        assert_eq!(session.recent(50).len(), 7);
    }
}
