//! Scenario runtime: the guard simulation, the moving target and the
//! console command schedule.

use crate::scenario::{Scenario, ScheduledCommand, TargetSpec};
use glam::Vec3;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warden_ai::capability::PathFollower;
use warden_ai::controller::{PatrolChaseController, Transition};
use warden_ai::gizmos::DetectionGizmo;
use warden_ai::obstacles::ObstacleField;
use warden_ai::simulation::{Simulation, StepEvent};
use warden_ai::steering::SteeringAgent;
use warden_ai::transform::{SharedTransform, Transform};
use warden_common::WardenResult;
use warden_tools::console::{CommandResult, DevConsole};
use warden_tools::guard_commands::{guard_command_defs, GuardCommands};

/// Simulation type driven by scenarios.
pub type GuardSim = Simulation<SteeringAgent, Arc<ObstacleField>>;

/// Distance at which the target counts as having reached a route point.
const ROUTE_TOLERANCE: f32 = 0.1;

/// Target walking a looping route.
#[derive(Debug)]
struct Walker {
    transform: SharedTransform,
    body: SteeringAgent,
    route: Vec<Vec3>,
    next: usize,
}

impl Walker {
    fn new(spec: &TargetSpec, transform: SharedTransform) -> Self {
        let mut body = SteeringAgent::new(Transform::new(spec.position)).with_speed(spec.speed);
        if let Some(&first) = spec.route.first() {
            body.set_destination(first);
        }
        Self {
            transform,
            body,
            route: spec.route.clone(),
            next: 0,
        }
    }

    fn advance(&mut self, dt: f32) {
        if !self.route.is_empty() && self.body.remaining_distance() < ROUTE_TOLERANCE {
            self.next = (self.next + 1) % self.route.len();
            self.body.set_destination(self.route[self.next]);
        }
        self.body.advance(dt);
        *self.transform.write() = self.body.transform();
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Steps taken
    pub steps: u64,
    /// Guards that spotted the target
    pub spotted: usize,
    /// Chases that were given up
    pub lost: usize,
    /// Console commands executed
    pub commands: usize,
}

/// Everything a scenario run needs.
#[derive(Debug)]
pub struct World {
    sim: GuardSim,
    walker: Option<Walker>,
    console: DevConsole,
    schedule: VecDeque<ScheduledCommand>,
    fixed_dt: f32,
    duration: f32,
    log_gizmos: bool,
    gizmo_interval: f32,
    gizmo_timer: f32,
}

impl World {
    /// Builds the runtime from a validated scenario.
    pub fn build(scenario: &Scenario) -> WardenResult<Self> {
        let field = Arc::new(ObstacleField::from_obstacles(
            scenario.obstacles.iter().map(|spec| spec.to_obstacle()).collect(),
        ));

        let mut sim = GuardSim::new();
        let target = scenario
            .target
            .as_ref()
            .map(|spec| (spec, sim.add_prop(spec.name.clone(), Transform::new(spec.position))));

        for spec in &scenario.guards {
            let body = Transform::new(spec.spawn_position()).with_yaw(spec.yaw_degrees);
            let mover = SteeringAgent::new(body).with_speed(spec.speed);
            let mut controller = PatrolChaseController::new(
                spec.config,
                spec.waypoints.clone(),
                mover,
                Arc::clone(&field),
            )?;
            if let Some((_, (_, transform))) = &target {
                controller.set_target(transform);
            }

            let id = sim.add_guard(spec.name.clone(), controller);
            for label in &spec.labels {
                sim.tag(id, label.clone())?;
            }
            debug!(%id, guard = %spec.name, labels = ?spec.labels, "guard spawned");
        }

        let walker = target.map(|(spec, (id, transform))| {
            debug!(%id, target = %spec.name, "target spawned");
            Walker::new(spec, transform)
        });

        let mut console = DevConsole::with_config(scenario.console.clone());
        console.register_commands(guard_command_defs());

        info!(
            guards = sim.guard_count(),
            obstacles = field.len(),
            commands = scenario.commands.len(),
            "scenario ready"
        );

        Ok(Self {
            sim,
            walker,
            console,
            schedule: scenario.schedule().into(),
            fixed_dt: scenario.run.fixed_dt,
            duration: scenario.run.duration,
            log_gizmos: scenario.run.log_gizmos,
            gizmo_interval: scenario.run.gizmo_interval,
            gizmo_timer: 0.0,
        })
    }

    /// Advances the world by one fixed step.
    pub fn step(&mut self) -> (Vec<StepEvent>, usize) {
        let dt = self.fixed_dt;
        if let Some(walker) = &mut self.walker {
            walker.advance(dt);
        }

        let events = self.sim.step(dt);
        let commands = self.run_due_commands();

        if self.log_gizmos {
            self.gizmo_timer += dt;
            if self.gizmo_timer >= self.gizmo_interval {
                self.gizmo_timer = 0.0;
                self.dump_gizmos();
            }
        }

        (events, commands)
    }

    /// Runs the scenario to its configured duration.
    pub fn run(&mut self) -> RunSummary {
        let steps = (self.duration / self.fixed_dt).round() as u64;
        let mut summary = RunSummary::default();

        for _ in 0..steps {
            let (events, commands) = self.step();
            summary.steps += 1;
            summary.commands += commands;
            for event in events {
                match event.transition {
                    Transition::TargetSpotted => summary.spotted += 1,
                    Transition::TargetLost => summary.lost += 1,
                }
            }
        }

        if !self.schedule.is_empty() {
            warn!(
                remaining = self.schedule.len(),
                "scenario ended before every command ran"
            );
        }
        summary
    }

    /// Executes one console command against the simulation.
    pub fn execute(&mut self, command: &str) -> CommandResult {
        self.console.set_clock(format!("{:.2}s", self.sim.elapsed()));
        let result = self
            .console
            .submit(command, &mut GuardCommands::new(&mut self.sim));
        for line in &result.output {
            if result.success {
                info!("{line}");
            } else {
                warn!("{line}");
            }
        }
        result
    }

    fn run_due_commands(&mut self) -> usize {
        let now = self.sim.elapsed();
        let mut ran = 0;
        while self
            .schedule
            .front()
            .is_some_and(|next| f64::from(next.at) <= now + f64::EPSILON)
        {
            let Some(next) = self.schedule.pop_front() else {
                break;
            };
            self.execute(&next.command);
            ran += 1;
        }
        ran
    }

    fn dump_gizmos(&self) {
        for id in self.sim.guard_ids() {
            let Some(guard) = self.sim.guard(id) else {
                continue;
            };
            let controller = guard.controller();
            let body = controller.mover().transform();
            let gizmo = DetectionGizmo::for_guard(&body, controller.config());
            let [left, right] = gizmo.edge_lines();
            debug!(
                guard = guard.name(),
                center = ?gizmo.center,
                radius = gizmo.radius,
                left = ?left.1,
                right = ?right.1,
                "detection gizmo"
            );
        }
    }

    /// Returns the simulation.
    #[must_use]
    pub fn sim(&self) -> &GuardSim {
        &self.sim
    }

    /// Returns the console.
    #[must_use]
    pub fn console(&self) -> &DevConsole {
        &self.console
    }

    /// Current target position, if the scenario has one.
    #[must_use]
    pub fn target_position(&self) -> Option<Vec3> {
        self.walker
            .as_ref()
            .map(|walker| walker.transform.read().position)
    }
}
