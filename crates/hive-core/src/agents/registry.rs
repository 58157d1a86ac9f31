//! Agent registry: owns agent records in creation order and keeps their
//! transfer relations and the on-disk snapshot in step with membership

use tracing::{debug, info, warn};

use super::profile::{AgentRecord, DEFAULT_MODEL};
use super::relations;
use crate::error::{HiveError, Result};
use crate::storage::AgentStore;

/// Named agent records, unique by name, listed in creation order
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: Vec<AgentRecord>,
    store: Option<AgentStore>,
    /// Model for agents created without one; empty means [`DEFAULT_MODEL`]
    default_model: String,
}

impl AgentRegistry {
    /// Create an in-memory registry with no backing file
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry backed by `store` and populate it from disk
    pub fn open(store: AgentStore) -> Self {
        let mut registry = Self {
            store: Some(store),
            ..Self::default()
        };
        registry.load_from_storage();
        registry
    }

    /// Use `model` for agents created without an explicit model
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn default_model(&self) -> &str {
        if self.default_model.trim().is_empty() {
            DEFAULT_MODEL
        } else {
            self.default_model.trim()
        }
    }

    /// Replace the in-memory agents with the stored snapshot.
    ///
    /// Missing files load as empty. Malformed snapshots are logged and leave
    /// the registry empty.
    pub fn load_from_storage(&mut self) {
        let Some(store) = &self.store else {
            return;
        };

        match store.load() {
            Ok(agents) => {
                self.agents = agents;
                relations::rebuild(&mut self.agents);
                info!("Loaded {} swarm agents from {}", self.agents.len(), store.path().display());
            }
            Err(e) => {
                warn!("Failed to load agents from {}: {}", store.path().display(), e);
                self.agents.clear();
            }
        }
    }

    /// Persist the registry. Failures are logged, not returned.
    pub fn save_to_storage(&self) -> bool {
        let Some(store) = &self.store else {
            return true;
        };

        match store.save(&self.agents) {
            Ok(()) => {
                info!("Saved {} swarm agents", self.agents.len());
                true
            }
            Err(e) => {
                warn!("Failed to save agents to {}: {}", store.path().display(), e);
                false
            }
        }
    }

    /// Register a new agent, rebuild relations and persist.
    pub fn create(
        &mut self,
        name: &str,
        instructions: &str,
        model: Option<&str>,
    ) -> Result<&AgentRecord> {
        let name = name.trim();
        if name.is_empty() || instructions.trim().is_empty() {
            return Err(HiveError::validation("Name and instructions required"));
        }
        if self.contains(name) {
            return Err(HiveError::DuplicateName(name.to_string()));
        }

        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model())
            .to_string();

        self.agents.push(AgentRecord::new(name, &model, instructions));
        relations::rebuild(&mut self.agents);
        self.save_to_storage();
        info!("Created swarm agent: {} (model: {})", name, model);

        let index = self.agents.len() - 1;
        Ok(&self.agents[index])
    }

    /// Insert every record whose name is not yet registered.
    ///
    /// Relations are rebuilt and the snapshot written once, and only when at
    /// least one agent was added. Returns the names that were added.
    pub fn insert_missing(&mut self, records: Vec<AgentRecord>) -> Vec<String> {
        let mut created = Vec::new();
        for record in records {
            if self.contains(&record.name) {
                debug!("Agent '{}' already registered, leaving it untouched", record.name);
                continue;
            }
            created.push(record.name.clone());
            self.agents.push(record);
        }

        if !created.is_empty() {
            relations::rebuild(&mut self.agents);
            self.save_to_storage();
        }
        created
    }

    /// Get an agent by name
    pub fn get(&self, name: &str) -> Option<&AgentRecord> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The earliest-created agent
    pub fn first(&self) -> Option<&AgentRecord> {
        self.agents.first()
    }

    /// All agents in creation order
    pub fn list(&self) -> &[AgentRecord] {
        &self.agents
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
