//! LLM provider abstraction used by the hand-off runner
//!
//! Providers implement the [`LlmProvider`] trait. Each request names the
//! model explicitly because every agent in a swarm carries its own model id.

pub mod anthropic;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use types::{
    ChatMessage, ChatResponse, ChatResponseBlock, ChatRole, ChatUsage, LlmProvider, StopReason,
    ToolDefinition,
};
