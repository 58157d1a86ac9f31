//! Conversation tools

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use hive_core::{Hive, HiveError};

use super::{ToolHandler, ToolOutput, json_schema, optional_str, truncate};

const HISTORY_WINDOW: usize = 5;
const HISTORY_PREVIEW_CHARS: usize = 100;

/// Run one swarm exchange from the user's message
pub struct ChatWithSwarmTool;

#[async_trait]
impl ToolHandler for ChatWithSwarmTool {
    fn name(&self) -> &str {
        "chat_with_swarm"
    }

    fn description(&self) -> &str {
        "Chat using Claude Swarm with automatic agent coordination"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            json!({
                "message": {
                    "type": "string",
                    "description": "Your message"
                },
                "agent_name": {
                    "type": "string",
                    "description": "Starting agent (optional)"
                }
            }),
            vec!["message"],
        )
    }

    async fn execute(&self, hive: &mut Hive, input: Value) -> Result<ToolOutput> {
        let message = optional_str(&input, "message")?.unwrap_or_default();
        let agent_name = optional_str(&input, "agent_name")?;

        match hive.chat(message, agent_name).await {
            Ok(reply) => {
                let mut text = format!("🤖 **{}**:\n\n{}", reply.agent, reply.content);
                if reply.transferred() {
                    text.push_str(&format!(
                        "\n\n🔄 **Agent Transfer**: {} → {}",
                        reply.starting_agent, reply.agent
                    ));
                }
                Ok(ToolOutput::success(text))
            }
            Err(HiveError::Collaborator(e)) => {
                warn!("Swarm error: {}", e);
                Ok(ToolOutput::failure(format!("Swarm error: {}", e)))
            }
            Err(e) => Ok(ToolOutput::failure(e)),
        }
    }
}

/// Summarise the session: active agent, context and recent messages
pub struct ConversationHistoryTool;

#[async_trait]
impl ToolHandler for ConversationHistoryTool {
    fn name(&self) -> &str {
        "get_conversation_history"
    }

    fn description(&self) -> &str {
        "View Swarm conversation state and agent transfers"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, hive: &mut Hive, _input: Value) -> Result<ToolOutput> {
        let session = hive.session();
        if session.transcript.is_empty() {
            return Ok(ToolOutput::success(
                "📝 No conversation history yet. Start chatting to see Swarm coordination!",
            ));
        }

        let mut out = String::from("🔄 **Swarm Conversation State**\n\n");
        out.push_str(&format!(
            "**Current Agent**: {}\n",
            session.active_agent.as_deref().unwrap_or("none")
        ));
        out.push_str(&format!(
            "**Context Variables**: {}\n",
            serde_json::to_string(&session.context)?
        ));
        out.push_str(&format!("**Message Count**: {}\n\n", session.message_count()));

        out.push_str("**Recent Messages**:\n");
        for (i, msg) in session.recent(HISTORY_WINDOW).iter().enumerate() {
            out.push_str(&format!(
                "{}. **{}**: {}\n",
                i + 1,
                msg.role.title(),
                truncate(&msg.content, HISTORY_PREVIEW_CHARS)
            ));
        }
        Ok(ToolOutput::success(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_core::{AgentRegistry, Message, SwarmRequest, SwarmResponse, SwarmRunner};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replies as the starting agent, or hands off to `handoff_to`
    #[derive(Default)]
    struct EchoRunner {
        handoff_to: Option<String>,
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SwarmRunner for EchoRunner {
        async fn run(&self, request: SwarmRequest<'_>) -> Result<SwarmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("upstream 529");
            }
            let agent = self
                .handoff_to
                .clone()
                .unwrap_or_else(|| request.agent.name.clone());
            let mut messages = request.messages.to_vec();
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            messages.push(Message::assistant(&agent, format!("echo: {}", last)));
            let mut context = request.context.clone();
            context.insert("turns".into(), json!(messages.len()));
            Ok(SwarmResponse {
                messages,
                agent,
                context,
            })
        }
    }

    fn hive_with(runner: EchoRunner) -> (Hive, Arc<EchoRunner>) {
        let runner = Arc::new(runner);
        (Hive::new(AgentRegistry::new(), runner.clone()), runner)
    }

    #[tokio::test]
    async fn test_chat_reply_format() {
        let (mut hive, _) = hive_with(EchoRunner::default());
        hive.create_agent("A", "inst", None).unwrap();

        let out = ChatWithSwarmTool
            .execute(&mut hive, json!({"message": "hi"}))
            .await
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.text, "🤖 **A**:\n\necho: hi");
    }

    #[tokio::test]
    async fn test_chat_reports_transfer() {
        let (mut hive, _) = hive_with(EchoRunner {
            handoff_to: Some("B".into()),
            ..Default::default()
        });
        hive.create_agent("A", "inst", None).unwrap();
        hive.create_agent("B", "inst", None).unwrap();

        let out = ChatWithSwarmTool
            .execute(&mut hive, json!({"message": "hi", "agent_name": "A"}))
            .await
            .unwrap();
        assert_eq!(out.text, "🤖 **B**:\n\necho: hi\n\n🔄 **Agent Transfer**: A → B");
        assert_eq!(hive.active_agent(), Some("B"));
    }

    #[tokio::test]
    async fn test_chat_empty_registry() {
        let (mut hive, runner) = hive_with(EchoRunner::default());
        let out = ChatWithSwarmTool
            .execute(&mut hive, json!({"message": "hi"}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.text, "❌ No agents available. Create agents first.");
        assert!(hive.session().transcript.is_empty());
        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_missing_message() {
        let (mut hive, runner) = hive_with(EchoRunner::default());
        hive.create_agent("A", "inst", None).unwrap();
        let out = ChatWithSwarmTool.execute(&mut hive, json!({})).await.unwrap();
        assert_eq!(out.text, "❌ Message is required");
        assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_runner_failure() {
        let (mut hive, _) = hive_with(EchoRunner {
            fail: true,
            ..Default::default()
        });
        hive.create_agent("A", "inst", None).unwrap();
        let out = ChatWithSwarmTool
            .execute(&mut hive, json!({"message": "hi"}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.text, "❌ Swarm error: upstream 529");
        assert!(hive.session().transcript.is_empty());
    }

    #[tokio::test]
    async fn test_history_empty() {
        let (mut hive, _) = hive_with(EchoRunner::default());
        let out = ConversationHistoryTool
            .execute(&mut hive, json!({}))
            .await
            .unwrap();
        assert_eq!(
            out.text,
            "📝 No conversation history yet. Start chatting to see Swarm coordination!"
        );
    }

    #[tokio::test]
    async fn test_history_shows_last_five() {
        let (mut hive, _) = hive_with(EchoRunner::default());
        hive.create_agent("A", "inst", None).unwrap();
        for i in 0..3 {
            hive.chat(&format!("message {}", i), None).await.unwrap();
        }

        let out = ConversationHistoryTool
            .execute(&mut hive, json!({}))
            .await
            .unwrap();
        let text = out.text;
        assert!(text.starts_with("🔄 **Swarm Conversation State**\n\n"));
        assert!(text.contains("**Current Agent**: A\n"));
        assert!(text.contains("**Context Variables**: {\"turns\":6}\n"));
        assert!(text.contains("**Message Count**: 6\n\n"));
        // Six messages, the oldest one falls out of the window
        assert!(!text.contains("**User**: message 0"));
        assert!(text.contains("1. **Assistant**: echo: message 0\n"));
        assert!(text.contains("5. **Assistant**: echo: message 2\n"));
    }

    #[tokio::test]
    async fn test_history_truncates_long_content() {
        let (mut hive, _) = hive_with(EchoRunner::default());
        hive.create_agent("A", "inst", None).unwrap();
        hive.chat(&"y".repeat(150), None).await.unwrap();

        let out = ConversationHistoryTool
            .execute(&mut hive, json!({}))
            .await
            .unwrap();
        assert!(out.text.contains(&format!("1. **User**: {}...\n", "y".repeat(100))));
    }
}
