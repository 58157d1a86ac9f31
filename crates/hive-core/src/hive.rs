//! The hive coordinator: owns the agent registry and session state and
//! drives chat exchanges through a [`SwarmRunner`]

use std::sync::Arc;

use tracing::{debug, info};

use crate::agents::{AgentRecord, AgentRegistry};
use crate::error::{HiveError, Result};
use crate::runner::{SwarmRequest, SwarmRunner};
use crate::session::SessionState;
use crate::teams::{self, DEFAULT_COMPANY, FINANCE_LEAD};
use crate::types::Message;

/// Visible outcome of one chat exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub starting_agent: String,
    /// Agent active at the end of the exchange
    pub agent: String,
    pub content: String,
}

impl ChatReply {
    pub fn transferred(&self) -> bool {
        self.starting_agent != self.agent
    }
}

/// Outcome of a preset team creation
#[derive(Debug, Clone, PartialEq)]
pub struct TeamReport {
    pub company: String,
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// All process state, passed explicitly to every request handler
pub struct Hive {
    registry: AgentRegistry,
    session: SessionState,
    runner: Arc<dyn SwarmRunner>,
}

impl Hive {
    pub fn new(registry: AgentRegistry, runner: Arc<dyn SwarmRunner>) -> Self {
        let mut session = SessionState::new();
        session.ensure_active(&registry);
        Self {
            registry,
            session,
            runner,
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn active_agent(&self) -> Option<&str> {
        self.session.active_agent.as_deref()
    }

    /// Register a new agent; the first agent ever created becomes active
    pub fn create_agent(
        &mut self,
        name: &str,
        instructions: &str,
        model: Option<&str>,
    ) -> Result<AgentRecord> {
        let agent = self.registry.create(name, instructions, model)?.clone();
        self.session.ensure_active(&self.registry);
        Ok(agent)
    }

    /// Create whichever finance specialists are missing.
    ///
    /// Existing agents are left untouched. When anything was created the
    /// risk analyst becomes the active agent.
    pub fn create_finance_team(&mut self, company: Option<&str>) -> TeamReport {
        let company = company
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COMPANY)
            .to_string();

        let team = teams::finance_team(&company);
        let names: Vec<String> = team.iter().map(|a| a.name.clone()).collect();
        let created = self.registry.insert_missing(team);

        if !created.is_empty() {
            self.session.active_agent = Some(FINANCE_LEAD.to_string());
            info!("Created swarm finance team for {}: {:?}", company, created);
        }

        let existing = names.into_iter().filter(|n| !created.contains(n)).collect();
        TeamReport {
            company,
            created,
            existing,
        }
    }

    /// Run one exchange starting from `agent_name`, the active agent, or the
    /// first registered agent, in that order of preference.
    ///
    /// Session state is only touched after the runner succeeds, and then in
    /// a single commit.
    pub async fn chat(&mut self, message: &str, agent_name: Option<&str>) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(HiveError::validation("Message is required"));
        }
        if self.registry.is_empty() {
            return Err(HiveError::validation("No agents available. Create agents first."));
        }

        let starting_agent = self
            .starting_agent(agent_name)
            .ok_or_else(|| HiveError::validation("No agents available. Create agents first."))?;

        let mut transcript = self.session.transcript.clone();
        transcript.push(Message::user(message));

        let response = self
            .runner
            .run(SwarmRequest {
                agent: &starting_agent,
                agents: self.registry.list(),
                messages: &transcript,
                context: &self.session.context,
            })
            .await
            .map_err(|e| HiveError::Collaborator(format!("{:#}", e)))?;

        if !self.registry.contains(&response.agent) {
            return Err(HiveError::Collaborator(format!(
                "runner ended on unknown agent '{}'",
                response.agent
            )));
        }

        let content = response
            .messages
            .last()
            .map(|m| m.content.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "No response".to_string());

        let reply = ChatReply {
            starting_agent: starting_agent.name,
            agent: response.agent.clone(),
            content,
        };

        self.session
            .commit(response.messages, response.agent, response.context);

        info!(
            "Swarm conversation completed: {} → {}",
            reply.starting_agent, reply.agent
        );
        Ok(reply)
    }

    fn starting_agent(&self, requested: Option<&str>) -> Option<AgentRecord> {
        if let Some(name) = requested.filter(|n| !n.is_empty()) {
            match self.registry.get(name) {
                Some(agent) => return Some(agent.clone()),
                None => debug!("{}; falling back", HiveError::NotFound(name.to_string())),
            }
        }

        self.active_agent()
            .and_then(|name| self.registry.get(name))
            .or_else(|| self.registry.first())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::SwarmResponse;
    use crate::storage::AgentStore;
    use crate::types::{ContextValues, Role};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Answers as the starting agent, or hands off to `handoff_to` when set
    #[derive(Default)]
    struct FakeRunner {
        handoff_to: Option<String>,
        fail: bool,
        context_update: ContextValues,
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl SwarmRunner for FakeRunner {
        async fn run(&self, request: SwarmRequest<'_>) -> anyhow::Result<SwarmResponse> {
            self.seen
                .lock()
                .unwrap()
                .push((request.agent.name.clone(), request.messages.len()));
            if self.fail {
                anyhow::bail!("model unavailable");
            }

            let mut messages = request.messages.to_vec();
            let agent = self
                .handoff_to
                .clone()
                .unwrap_or_else(|| request.agent.name.clone());
            if agent != request.agent.name {
                messages.push(Message::tool(&request.agent.name, format!("Transferred to {}", agent)));
            }
            messages.push(Message::assistant(&agent, format!("{} here", agent)));

            let mut context = request.context.clone();
            for (k, v) in &self.context_update {
                context.insert(k.clone(), v.clone());
            }
            Ok(SwarmResponse { messages, agent, context })
        }
    }

    fn hive_with(runner: FakeRunner) -> (Hive, Arc<FakeRunner>) {
        let runner = Arc::new(runner);
        (Hive::new(AgentRegistry::new(), runner.clone()), runner)
    }

    #[test]
    fn test_create_scenario() {
        let (mut hive, _) = hive_with(FakeRunner::default());

        let a = hive.create_agent("A", "You are A.", None).unwrap();
        assert!(a.transfer_targets.is_empty());
        assert_eq!(hive.registry().len(), 1);
        assert_eq!(hive.active_agent(), Some("A"));

        hive.create_agent("B", "You are B.", None).unwrap();
        assert_eq!(hive.registry().get("A").unwrap().transfer_targets, vec!["B".to_string()]);
        assert_eq!(hive.registry().get("B").unwrap().transfer_targets, vec!["A".to_string()]);
        assert_eq!(hive.active_agent(), Some("A"));
    }

    #[test]
    fn test_new_hive_picks_first_loaded_agent() {
        let temp = TempDir::new().unwrap();
        let store = AgentStore::new(temp.path().join("agents.json"));
        {
            let mut registry = AgentRegistry::open(store.clone());
            registry.create("First", "inst", None).unwrap();
            registry.create("Second", "inst", None).unwrap();
        }
        let hive = Hive::new(AgentRegistry::open(store), Arc::new(FakeRunner::default()));
        assert_eq!(hive.active_agent(), Some("First"));
    }

    #[tokio::test]
    async fn test_chat_empty_message_does_not_touch_state() {
        let (mut hive, runner) = hive_with(FakeRunner::default());
        hive.create_agent("A", "inst", None).unwrap();

        let err = hive.chat("   ", None).await.unwrap_err();
        assert!(matches!(err, HiveError::Validation(_)));
        assert!(hive.session().transcript.is_empty());
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_empty_registry_fails() {
        let (mut hive, runner) = hive_with(FakeRunner::default());
        let err = hive.chat("hi", None).await.unwrap_err();
        assert!(err.to_string().contains("No agents available"));
        assert!(hive.session().transcript.is_empty());
        assert!(runner.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_commits_transcript() {
        let (mut hive, runner) = hive_with(FakeRunner::default());
        hive.create_agent("A", "inst", None).unwrap();

        let reply = hive.chat("hi", None).await.unwrap();
        assert_eq!(reply.agent, "A");
        assert_eq!(reply.content, "A here");
        assert!(!reply.transferred());

        let transcript = &hive.session().transcript;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], Message::user("hi"));
        assert_eq!(transcript[1].role, Role::Assistant);

        hive.chat("again", None).await.unwrap();
        assert_eq!(hive.session().message_count(), 4);
        assert_eq!(runner.seen.lock().unwrap()[1], ("A".to_string(), 3));
    }

    #[tokio::test]
    async fn test_chat_handoff_updates_active_agent() {
        let (mut hive, _) = hive_with(FakeRunner {
            handoff_to: Some("B".to_string()),
            ..Default::default()
        });
        hive.create_agent("A", "inst", None).unwrap();
        hive.create_agent("B", "inst", None).unwrap();

        let reply = hive.chat("need B", None).await.unwrap();
        assert!(reply.transferred());
        assert_eq!(reply.starting_agent, "A");
        assert_eq!(hive.active_agent(), Some("B"));
    }

    #[tokio::test]
    async fn test_chat_starting_agent_resolution() {
        let (mut hive, runner) = hive_with(FakeRunner::default());
        hive.create_agent("A", "inst", None).unwrap();
        hive.create_agent("B", "inst", None).unwrap();

        hive.chat("explicit", Some("B")).await.unwrap();
        // B answered, so B is now active
        hive.chat("unknown name falls back to active", Some("Nobody")).await.unwrap();
        hive.chat("no name uses active", None).await.unwrap();

        let seen: Vec<String> = runner.seen.lock().unwrap().iter().map(|s| s.0.clone()).collect();
        assert_eq!(seen, vec!["B", "B", "B"]);
    }

    #[tokio::test]
    async fn test_chat_failure_leaves_session_unchanged() {
        let (mut hive, _) = hive_with(FakeRunner {
            fail: true,
            ..Default::default()
        });
        hive.create_agent("A", "inst", None).unwrap();

        let err = hive.chat("hi", None).await.unwrap_err();
        assert!(matches!(err, HiveError::Collaborator(ref m) if m.contains("model unavailable")));
        assert!(hive.session().transcript.is_empty());
        assert_eq!(hive.active_agent(), Some("A"));
    }

    #[tokio::test]
    async fn test_chat_rejects_unknown_final_agent() {
        let (mut hive, _) = hive_with(FakeRunner {
            handoff_to: Some("Ghost".to_string()),
            ..Default::default()
        });
        hive.create_agent("A", "inst", None).unwrap();

        assert!(matches!(
            hive.chat("hi", None).await,
            Err(HiveError::Collaborator(_))
        ));
        assert!(hive.session().transcript.is_empty());
    }

    #[tokio::test]
    async fn test_chat_merges_context() {
        let mut update = ContextValues::new();
        update.insert("ticker".into(), json!("NVDA"));
        let (mut hive, _) = hive_with(FakeRunner {
            context_update: update,
            ..Default::default()
        });
        hive.create_agent("A", "inst", None).unwrap();

        hive.chat("hi", None).await.unwrap();
        assert_eq!(hive.session().context["ticker"], json!("NVDA"));
    }

    #[test]
    fn test_finance_team_is_idempotent() {
        let (mut hive, _) = hive_with(FakeRunner::default());

        let first = hive.create_finance_team(Some("Acme"));
        assert_eq!(first.created.len(), 4);
        assert!(first.existing.is_empty());
        assert_eq!(hive.active_agent(), Some(FINANCE_LEAD));

        let second = hive.create_finance_team(Some("Acme"));
        assert!(second.created.is_empty());
        assert_eq!(second.existing.len(), 4);
        assert_eq!(hive.registry().len(), 4);
        for agent in hive.registry().list() {
            assert_eq!(agent.transfer_targets.len(), 3);
        }
    }

    #[test]
    fn test_finance_team_keeps_existing_agent() {
        let (mut hive, _) = hive_with(FakeRunner::default());
        hive.create_agent("Data_Analyst", "custom", None).unwrap();

        let report = hive.create_finance_team(None);
        assert_eq!(report.company, DEFAULT_COMPANY);
        assert_eq!(report.created.len(), 3);
        assert_eq!(report.existing, vec!["Data_Analyst".to_string()]);
        assert_eq!(hive.registry().get("Data_Analyst").unwrap().instructions, "custom");
        assert_eq!(hive.active_agent(), Some(FINANCE_LEAD));
    }
}
