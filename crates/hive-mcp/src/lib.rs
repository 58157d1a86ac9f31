//! hive-mcp - Model Context Protocol front end for the hive swarm
//!
//! Speaks line-delimited JSON-RPC 2.0 over stdio and routes `tools/call`
//! requests to the five swarm tools.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
pub use tools::{ToolHandler, ToolOutput, ToolRouter};
