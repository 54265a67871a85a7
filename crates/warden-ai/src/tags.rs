//! Label registry used to address groups of agents.

use ahash::{AHashMap, AHashSet};
use warden_common::AgentId;

/// Mapping from label to the agents carrying it.
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    by_label: AHashMap<String, AHashSet<AgentId>>,
}

impl TagRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `label` to an agent. Returns false if it was already present.
    pub fn tag(&mut self, agent: AgentId, label: impl Into<String>) -> bool {
        self.by_label.entry(label.into()).or_default().insert(agent)
    }

    /// Removes `label` from an agent. Returns whether it was present.
    pub fn untag(&mut self, agent: AgentId, label: &str) -> bool {
        let Some(agents) = self.by_label.get_mut(label) else {
            return false;
        };
        let removed = agents.remove(&agent);
        if agents.is_empty() {
            self.by_label.remove(label);
        }
        removed
    }

    /// Removes an agent from every label.
    pub fn forget(&mut self, agent: AgentId) {
        self.by_label.retain(|_, agents| {
            agents.remove(&agent);
            !agents.is_empty()
        });
    }

    /// Agents carrying `label`, in id order.
    #[must_use]
    pub fn tagged(&self, label: &str) -> Vec<AgentId> {
        let mut agents: Vec<AgentId> = self
            .by_label
            .get(label)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        agents.sort_unstable();
        agents
    }

    /// Whether an agent carries `label`.
    #[must_use]
    pub fn has_tag(&self, agent: AgentId, label: &str) -> bool {
        self.by_label
            .get(label)
            .is_some_and(|agents| agents.contains(&agent))
    }

    /// Labels carried by an agent, sorted.
    #[must_use]
    pub fn labels_of(&self, agent: AgentId) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .by_label
            .iter()
            .filter(|(_, agents)| agents.contains(&agent))
            .map(|(label, _)| label.as_str())
            .collect();
        labels.sort_unstable();
        labels
    }

    /// Number of distinct labels in use.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.by_label.len()
    }
}
