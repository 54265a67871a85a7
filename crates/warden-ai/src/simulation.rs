//! Explicit fixed-step simulation loop.
//!
//! The host owns every guard and prop. Each step ticks every guard's state
//! machine in id order and then integrates its path follower.

use crate::batch::{reset_batch, ResetReport};
use crate::capability::{OcclusionQuery, PathFollower};
use crate::controller::{is_valid_timestep, PatrolChaseController, Resettable, Transition};
use crate::tags::TagRegistry;
use crate::transform::{shared, SharedTransform, Transform};
use ahash::AHashMap;
use tracing::{info, warn};
use warden_common::{AgentId, SimError};

/// A guard registered with the simulation.
#[derive(Debug)]
pub struct Guard<P, O> {
    name: String,
    controller: PatrolChaseController<P, O>,
}

impl<P, O> Guard<P, O> {
    /// Returns the guard's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the controller.
    #[must_use]
    pub fn controller(&self) -> &PatrolChaseController<P, O> {
        &self.controller
    }

    /// Returns the controller mutably.
    pub fn controller_mut(&mut self) -> &mut PatrolChaseController<P, O> {
        &mut self.controller
    }
}

impl<P: PathFollower, O: OcclusionQuery> Resettable for Guard<P, O> {
    fn reset(&mut self) {
        self.controller.reset();
    }
}

/// A body with a transform but no controller (targets, decor).
#[derive(Debug, Clone)]
pub struct Prop {
    name: String,
    transform: SharedTransform,
}

impl Prop {
    /// Returns the prop's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shared transform.
    #[must_use]
    pub fn transform(&self) -> &SharedTransform {
        &self.transform
    }
}

/// A state change observed during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// Simulation time at the end of the step
    pub time: f64,
    /// Guard that changed state
    pub agent: AgentId,
    /// What happened
    pub transition: Transition,
}

/// Owns guards and props and advances them in lockstep.
#[derive(Debug)]
pub struct Simulation<P, O> {
    guards: AHashMap<AgentId, Guard<P, O>>,
    props: AHashMap<AgentId, Prop>,
    tags: TagRegistry,
    elapsed: f64,
    steps: u64,
}

impl<P, O> Default for Simulation<P, O> {
    fn default() -> Self {
        Self {
            guards: AHashMap::new(),
            props: AHashMap::new(),
            tags: TagRegistry::new(),
            elapsed: 0.0,
            steps: 0,
        }
    }
}

impl<P: PathFollower, O: OcclusionQuery> Simulation<P, O> {
    /// Creates an empty simulation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guard under a fresh id.
    pub fn add_guard(
        &mut self,
        name: impl Into<String>,
        controller: PatrolChaseController<P, O>,
    ) -> AgentId {
        let id = AgentId::new();
        self.guards.insert(
            id,
            Guard {
                name: name.into(),
                controller,
            },
        );
        id
    }

    /// Adds a guard under an existing id.
    pub fn insert_guard(
        &mut self,
        id: AgentId,
        name: impl Into<String>,
        controller: PatrolChaseController<P, O>,
    ) -> Result<(), SimError> {
        if self.contains(id) {
            return Err(SimError::AlreadyRegistered(id));
        }
        self.guards.insert(
            id,
            Guard {
                name: name.into(),
                controller,
            },
        );
        Ok(())
    }

    /// Adds a prop and returns its id and shared transform.
    pub fn add_prop(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
    ) -> (AgentId, SharedTransform) {
        let id = AgentId::new();
        let transform = shared(transform);
        self.props.insert(
            id,
            Prop {
                name: name.into(),
                transform: transform.clone(),
            },
        );
        (id, transform)
    }

    /// Removes a guard or prop and all of its labels.
    pub fn remove(&mut self, id: AgentId) -> Result<(), SimError> {
        let removed = self.guards.remove(&id).is_some() || self.props.remove(&id).is_some();
        if !removed {
            return Err(SimError::NotFound(id));
        }
        self.tags.forget(id);
        Ok(())
    }

    /// Labels an agent.
    pub fn tag(&mut self, id: AgentId, label: impl Into<String>) -> Result<bool, SimError> {
        if !self.contains(id) {
            return Err(SimError::NotFound(id));
        }
        Ok(self.tags.tag(id, label))
    }

    /// Advances every guard by `dt` seconds. Invalid steps are skipped.
    pub fn step(&mut self, dt: f32) -> Vec<StepEvent> {
        if !is_valid_timestep(dt) {
            warn!(dt, "invalid timestep, step skipped");
            return Vec::new();
        }
        self.elapsed += f64::from(dt);
        self.steps += 1;

        let mut events = Vec::new();
        for id in self.guard_ids() {
            let Some(guard) = self.guards.get_mut(&id) else {
                continue;
            };
            let transition = guard.controller.tick(dt);
            guard.controller.mover_mut().advance(dt);

            if let Some(transition) = transition {
                info!(
                    guard = %guard.name,
                    state = %transition.next_state(),
                    time = self.elapsed,
                    "guard changed state"
                );
                events.push(StepEvent {
                    time: self.elapsed,
                    agent: id,
                    transition,
                });
            }
        }
        events
    }

    /// Runs fixed steps of `dt` until `duration` seconds have elapsed.
    pub fn run(&mut self, duration: f32, dt: f32) -> Vec<StepEvent> {
        if !is_valid_timestep(dt) {
            warn!(dt, "invalid timestep, nothing to run");
            return Vec::new();
        }
        let steps = (duration / dt).round() as u64;
        (0..steps).flat_map(|_| self.step(dt)).collect()
    }

    /// Resets every guard labelled `label`.
    pub fn reset_tagged(&mut self, label: &str) -> ResetReport {
        reset_batch(label, &self.tags, &mut self.guards)
    }
}

impl<P, O> Simulation<P, O> {
    /// Whether a guard or prop with this id exists.
    #[must_use]
    pub fn contains(&self, id: AgentId) -> bool {
        self.guards.contains_key(&id) || self.props.contains_key(&id)
    }

    /// Returns a guard.
    #[must_use]
    pub fn guard(&self, id: AgentId) -> Option<&Guard<P, O>> {
        self.guards.get(&id)
    }

    /// Returns a guard mutably.
    pub fn guard_mut(&mut self, id: AgentId) -> Option<&mut Guard<P, O>> {
        self.guards.get_mut(&id)
    }

    /// Returns a prop.
    #[must_use]
    pub fn prop(&self, id: AgentId) -> Option<&Prop> {
        self.props.get(&id)
    }

    /// Guard ids in ascending order.
    #[must_use]
    pub fn guard_ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.guards.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of guards.
    #[must_use]
    pub fn guard_count(&self) -> usize {
        self.guards.len()
    }

    /// Returns the label registry.
    #[must_use]
    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Seconds simulated so far.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Steps taken so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
