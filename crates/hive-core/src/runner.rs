//! Swarm runner: the capability that plays a conversation across agents
//!
//! [`SwarmRunner`] is the single seam between the coordinator and whatever
//! performs the multi-agent exchange. [`HandoffRunner`] is the default
//! implementation: it asks the current agent's model for a reply and offers
//! one `transfer_to_<agent>` tool per transfer target. Calling a transfer
//! tool switches the active agent and the loop continues with the new agent.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::agents::AgentRecord;
use crate::agents::profile::transfer_tool_name;
use crate::context::build_system_prompt;
use crate::providers::{ChatMessage, ChatResponse, ChatUsage, LlmProvider, StopReason, ToolDefinition};
use crate::types::{ContextValues, Message, Role};

/// Input to a swarm run
#[derive(Debug, Clone, Copy)]
pub struct SwarmRequest<'a> {
    /// Agent that takes the first turn
    pub agent: &'a AgentRecord,
    /// Every registered agent, for resolving hand-offs
    pub agents: &'a [AgentRecord],
    /// Full transcript, ending with the new user message
    pub messages: &'a [Message],
    pub context: &'a ContextValues,
}

/// Result of a swarm run
#[derive(Debug, Clone)]
pub struct SwarmResponse {
    /// Full transcript including everything produced during the run
    pub messages: Vec<Message>,
    /// Agent active when the run ended
    pub agent: String,
    pub context: ContextValues,
}

/// Trait for running one exchange across the swarm
#[async_trait]
pub trait SwarmRunner: Send + Sync {
    async fn run(&self, request: SwarmRequest<'_>) -> Result<SwarmResponse>;
}

/// Configuration for the hand-off runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum tool-enabled model calls per exchange. A run that hits the
    /// limit gets one extra closing call without tools.
    pub max_turns: usize,
    /// Overall time limit for one exchange
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            timeout_secs: 300,
        }
    }
}

/// Default runner: model-driven hand-offs over an [`LlmProvider`]
pub struct HandoffRunner {
    provider: Arc<dyn LlmProvider>,
    config: RunnerConfig,
}

impl HandoffRunner {
    pub fn new(provider: Arc<dyn LlmProvider>, config: RunnerConfig) -> Self {
        Self { provider, config }
    }

    async fn run_inner(&self, request: SwarmRequest<'_>) -> Result<SwarmResponse> {
        let mut agent = request.agent;
        let mut messages = request.messages.to_vec();
        let mut usage = ChatUsage::default();

        for turn in 1..=self.config.max_turns {
            debug!("Swarm turn {} with agent {}", turn, agent.name);

            let tools = transfer_tools(agent);
            let response = self
                .call_model(agent, &messages, &tools, request.context, &mut usage)
                .await?;

            let text = response.text();
            let calls: Vec<&str> = response.tool_calls().collect();

            if !text.trim().is_empty() {
                messages.push(Message::assistant(&agent.name, text.trim()));
            }

            if calls.is_empty() {
                if text.trim().is_empty() {
                    return Err(anyhow!("No text response from agent {}", agent.name));
                }
                return Ok(self.finish(agent, messages, request.context, usage));
            }

            let mut next: Option<&AgentRecord> = None;
            for call in calls {
                match resolve_transfer(agent, request.agents, call) {
                    Some(target) => {
                        messages.push(Message::tool(&agent.name, format!("Transferred to {}", target.name)));
                        next = Some(target);
                    }
                    None => {
                        warn!("Agent {} called unknown tool {}", agent.name, call);
                        messages.push(Message::tool(&agent.name, format!("Error: Tool {} not found.", call)));
                    }
                }
            }

            if let Some(target) = next {
                info!("Agent transfer: {} → {}", agent.name, target.name);
                agent = target;
            }
        }

        warn!(
            "Swarm run reached max turns ({}), ending with agent {}",
            self.config.max_turns, agent.name
        );

        // The transcript must not end on a tool note, which would be shown as the reply
        if messages.last().is_some_and(|m| m.role == Role::Tool) {
            info!("Asking {} for a closing reply without tools", agent.name);
            let response = self
                .call_model(agent, &messages, &[], request.context, &mut usage)
                .await?;
            let text = response.text();
            if text.trim().is_empty() {
                warn!("Agent {} gave no closing reply; transcript ends on a tool note", agent.name);
            } else {
                messages.push(Message::assistant(&agent.name, text.trim()));
            }
        }

        Ok(self.finish(agent, messages, request.context, usage))
    }

    async fn call_model(
        &self,
        agent: &AgentRecord,
        messages: &[Message],
        tools: &[ToolDefinition],
        context: &ContextValues,
        usage: &mut ChatUsage,
    ) -> Result<ChatResponse> {
        let system = build_system_prompt(agent, context);
        let wire = to_chat_messages(messages);

        let response = self
            .provider
            .chat(&agent.model, &wire, tools, &system)
            .await
            .with_context(|| {
                format!(
                    "{} request failed for agent {}",
                    self.provider.provider_name(),
                    agent.name
                )
            })?;

        usage.input_tokens += response.usage.input_tokens;
        usage.output_tokens += response.usage.output_tokens;
        if response.stop_reason == StopReason::MaxTokens {
            warn!("Reply from agent {} was cut off at the max_tokens limit", agent.name);
        }
        Ok(response)
    }

    fn finish(
        &self,
        agent: &AgentRecord,
        messages: Vec<Message>,
        context: &ContextValues,
        usage: ChatUsage,
    ) -> SwarmResponse {
        debug!(
            "Swarm run finished with {}: {} input / {} output tokens",
            agent.name, usage.input_tokens, usage.output_tokens
        );
        SwarmResponse {
            messages,
            agent: agent.name.clone(),
            context: context.clone(),
        }
    }
}

#[async_trait]
impl SwarmRunner for HandoffRunner {
    async fn run(&self, request: SwarmRequest<'_>) -> Result<SwarmResponse> {
        tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.run_inner(request),
        )
        .await
        .map_err(|_| anyhow!("Swarm run timed out after {} seconds", self.config.timeout_secs))?
    }
}

/// One transfer tool per hand-off target
fn transfer_tools(agent: &AgentRecord) -> Vec<ToolDefinition> {
    agent
        .transfer_targets
        .iter()
        .map(|target| ToolDefinition {
            name: transfer_tool_name(target),
            description: format!("Transfer to {} for their specialized expertise", target),
            input_schema: serde_json::json!({"type": "object", "properties": {}}),
        })
        .collect()
}

fn resolve_transfer<'a>(
    agent: &AgentRecord,
    agents: &'a [AgentRecord],
    tool_name: &str,
) -> Option<&'a AgentRecord> {
    let target = agent
        .transfer_targets
        .iter()
        .find(|t| transfer_tool_name(t) == tool_name)?;
    agents.iter().find(|a| &a.name == target)
}

/// Flatten the transcript into plain user/assistant turns.
///
/// Tool messages become user-side notes so the conversation always ends on
/// a user turn after a hand-off.
fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| match m.role {
            Role::User => ChatMessage::user(m.content.clone()),
            Role::Assistant => ChatMessage::assistant(m.content.clone()),
            Role::Tool => {
                let sender = m.sender.as_deref().unwrap_or("agent");
                ChatMessage::user(format!("[{}] {}", sender, m.content))
            }
        })
        .collect()
}
