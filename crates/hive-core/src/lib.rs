//! hive-core - agent registry and swarm coordination for hive
//!
//! This crate provides:
//! - Agent registry with JSON snapshot persistence and derived transfer relations
//! - Session state (active agent, transcript, shared context values)
//! - The `Hive` coordinator that owns both and drives chat exchanges
//! - A `SwarmRunner` seam with a default hand-off runner backed by an LLM provider
//! - Preset agent teams

pub mod agents;
pub mod context;
pub mod error;
pub mod hive;
pub mod providers;
pub mod runner;
pub mod session;
pub mod storage;
pub mod teams;
pub mod types;

// Re-export main types for convenience
pub use agents::{AgentRecord, AgentRegistry, DEFAULT_MODEL};
pub use error::{HiveError, Result};
pub use hive::{ChatReply, Hive, TeamReport};
pub use runner::{HandoffRunner, RunnerConfig, SwarmRequest, SwarmResponse, SwarmRunner};
pub use session::SessionState;
pub use storage::AgentStore;
pub use types::{ContextValues, Message, Role};
