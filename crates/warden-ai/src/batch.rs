//! Batch reset of every agent carrying a label.

use crate::controller::Resettable;
use crate::tags::TagRegistry;
use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, info};
use warden_common::AgentId;

/// Outcome of a batch reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    /// Label that was matched
    pub label: String,
    /// Agents carrying the label
    pub matched: usize,
    /// Agents that were reset
    pub reset: usize,
    /// Tagged agents without a controller
    pub skipped: usize,
}

/// Resets every agent tagged `label` that has a controller in `agents`.
///
/// Tagged ids missing from `agents` are skipped.
pub fn reset_batch<R: Resettable>(
    label: &str,
    tags: &TagRegistry,
    agents: &mut AHashMap<AgentId, R>,
) -> ResetReport {
    let tagged = tags.tagged(label);
    let mut report = ResetReport {
        label: label.to_string(),
        matched: tagged.len(),
        reset: 0,
        skipped: 0,
    };

    for id in tagged {
        match agents.get_mut(&id) {
            Some(agent) => {
                agent.reset();
                report.reset += 1;
            },
            None => {
                debug!(%id, label, "tagged agent has no controller, skipping");
                report.skipped += 1;
            },
        }
    }

    info!(
        label,
        reset = report.reset,
        skipped = report.skipped,
        "batch reset complete"
    );
    report
}
