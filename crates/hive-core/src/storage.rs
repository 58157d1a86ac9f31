//! JSON snapshot persistence for agent definitions
//!
//! The snapshot is a single JSON object mapping agent name to
//! `{name, model, instructions}`. Transfer relations are never stored.
//! Writes go to a temporary file next to the target which is then renamed
//! over it, so readers see either the old snapshot or the new one.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::agents::AgentRecord;
use crate::error::{HiveError, Result};

/// File-backed store for the agent registry
#[derive(Debug, Clone)]
pub struct AgentStore {
    path: PathBuf,
}

impl AgentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot.
    ///
    /// A missing file is an empty registry. Any parse problem fails the whole
    /// load so callers never see a partial set of agents.
    pub fn load(&self) -> Result<Vec<AgentRecord>> {
        if !self.path.exists() {
            debug!("No agent snapshot at {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            HiveError::Storage(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let entries: Map<String, Value> = serde_json::from_str(&content).map_err(|e| {
            HiveError::Storage(format!("malformed snapshot {}: {}", self.path.display(), e))
        })?;

        let mut agents = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let agent: AgentRecord = serde_json::from_value(value).map_err(|e| {
                HiveError::Storage(format!("malformed entry '{}': {}", key, e))
            })?;
            if agent.name != key {
                return Err(HiveError::Storage(format!(
                    "entry '{}' has mismatched name '{}'",
                    key, agent.name
                )));
            }
            agents.push(agent);
        }

        debug!("Read {} agents from {}", agents.len(), self.path.display());
        Ok(agents)
    }

    /// Replace the snapshot with `agents`, preserving their order.
    pub fn save(&self, agents: &[AgentRecord]) -> Result<()> {
        let mut entries = Map::new();
        for agent in agents {
            let value = serde_json::to_value(agent)
                .map_err(|e| HiveError::Storage(format!("failed to encode '{}': {}", agent.name, e)))?;
            entries.insert(agent.name.clone(), value);
        }
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| HiveError::Storage(format!("failed to encode snapshot: {}", e)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| {
            HiveError::Storage(format!("failed to create {}: {}", dir.display(), e))
        })?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| HiveError::Storage(format!("failed to create temp file: {}", e)))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| HiveError::Storage(format!("failed to write snapshot: {}", e)))?;
        tmp.persist(&self.path).map_err(|e| {
            HiveError::Storage(format!("failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!("Wrote {} agents to {}", agents.len(), self.path.display());
        Ok(())
    }
}
