//! Transfer relation builder
//!
//! Every agent may hand off to every other registered agent. The relation is
//! plain data on each record and is recomputed from scratch whenever
//! membership changes.

use tracing::debug;

use super::profile::AgentRecord;

/// Set each agent's transfer targets to all other agents' names, in slice order.
pub fn rebuild(agents: &mut [AgentRecord]) {
    let names: Vec<String> = agents.iter().map(|a| a.name.clone()).collect();

    for agent in agents.iter_mut() {
        agent.transfer_targets = names
            .iter()
            .filter(|name| **name != agent.name)
            .cloned()
            .collect();
    }

    debug!("Rebuilt transfer relations for {} agents", agents.len());
}
