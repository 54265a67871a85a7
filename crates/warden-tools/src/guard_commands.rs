//! Console commands acting on the guards of a running simulation.

use crate::console::{CommandDef, CommandHandler, CommandResult, OutputLine};
use warden_ai::capability::{OcclusionQuery, PathFollower};
use warden_ai::simulation::Simulation;

/// Label used by `reset_guards` when none is given.
pub const DEFAULT_GUARD_LABEL: &str = "Guard";

/// Definitions of the guard commands, for registration with a console.
#[must_use]
pub fn guard_command_defs() -> Vec<CommandDef> {
    vec![
        CommandDef::new(
            "reset_guards",
            "Reset every guard carrying a label to its initial patrol",
            "reset_guards [label]",
        ),
        CommandDef::new(
            "guards",
            "List guards with their state, waypoint and timers",
            "guards [label]",
        ),
    ]
}

/// Command handler bound to a simulation for the duration of one command.
#[derive(Debug)]
pub struct GuardCommands<'a, P, O> {
    sim: &'a mut Simulation<P, O>,
}

impl<'a, P: PathFollower, O: OcclusionQuery> GuardCommands<'a, P, O> {
    /// Binds the handler to a simulation.
    pub fn new(sim: &'a mut Simulation<P, O>) -> Self {
        Self { sim }
    }

    fn reset_guards(&mut self, args: &[&str]) -> CommandResult {
        let label = match args {
            [] => DEFAULT_GUARD_LABEL,
            [label] => *label,
            _ => return CommandResult::err("Usage: reset_guards [label]"),
        };

        let report = self.sim.reset_tagged(label);
        let mut lines = Vec::new();
        if report.matched == 0 {
            lines.push(OutputLine::warning(format!("No agents tagged with {label}")));
        }
        if report.skipped > 0 {
            lines.push(OutputLine::info(format!(
                "Skipped {} tagged agent(s) without a guard controller",
                report.skipped
            )));
        }
        lines.push(OutputLine::success(format!(
            "Guards tagged with {label} have been reset"
        )));
        CommandResult::with_lines(lines)
    }

    fn list_guards(&self, args: &[&str]) -> CommandResult {
        let filter = match args {
            [] => None,
            [label] => Some(*label),
            _ => return CommandResult::err("Usage: guards [label]"),
        };

        let tags = self.sim.tags();
        let mut lines = Vec::new();
        for id in self.sim.guard_ids() {
            if filter.is_some_and(|label| !tags.has_tag(id, label)) {
                continue;
            }
            let Some(guard) = self.sim.guard(id) else {
                continue;
            };
            let controller = guard.controller();
            lines.push(OutputLine::info(format!(
                "{id} {}: {} waypoint={} wait={:.2} lost={:.2}",
                guard.name(),
                controller.state(),
                controller.current_waypoint_index(),
                controller.wait_timer(),
                controller.lost_target_timer(),
            )));
        }

        if lines.is_empty() {
            return CommandResult::ok(vec![OutputLine::info("No guards.")]);
        }
        CommandResult::ok(lines)
    }
}

impl<P: PathFollower, O: OcclusionQuery> CommandHandler for GuardCommands<'_, P, O> {
    fn handle(&mut self, command: &str, args: &[&str]) -> Option<CommandResult> {
        match command {
            "reset_guards" => Some(self.reset_guards(args)),
            "guards" => Some(self.list_guards(args)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{DevConsole, OutputLevel};
    use glam::Vec3;
    use warden_ai::capability::OpenSky;
    use warden_ai::config::AgentConfig;
    use warden_ai::controller::PatrolChaseController;
    use warden_ai::steering::SteeringAgent;
    use warden_ai::transform::Transform;
    use warden_common::AgentId;

    type TestSim = Simulation<SteeringAgent, OpenSky>;

    fn add_guard(sim: &mut TestSim, name: &str, home: Vec3, label: &str) -> AgentId {
        let mover = SteeringAgent::new(Transform::new(home + Vec3::X));
        let controller =
            PatrolChaseController::new(AgentConfig::default(), vec![home], mover, OpenSky)
                .expect("valid config");
        let id = sim.add_guard(name, controller);
        sim.tag(id, label).expect("guard exists");
        id
    }

    fn position(sim: &TestSim, id: AgentId) -> Option<Vec3> {
        sim.guard(id).map(|g| g.controller().mover().position())
    }

    #[test]
    fn test_reset_guards_defaults_to_guard_label() {
        let mut sim = TestSim::new();
        let a = add_guard(&mut sim, "a", Vec3::ZERO, "Guard");
        let b = add_guard(&mut sim, "b", Vec3::new(5.0, 0.0, 0.0), "Sentry");

        let mut console = DevConsole::new();
        console.register_commands(guard_command_defs());
        let result = console.submit("reset_guards", &mut GuardCommands::new(&mut sim));

        assert!(result.success);
        assert_eq!(
            result.output.last(),
            Some(&OutputLine::success("Guards tagged with Guard have been reset"))
        );
        assert_eq!(position(&sim, a), Some(Vec3::ZERO));
        assert_eq!(position(&sim, b), Some(Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn test_reset_guards_with_custom_label() {
        let mut sim = TestSim::new();
        let a = add_guard(&mut sim, "a", Vec3::ZERO, "Guard");
        let b = add_guard(&mut sim, "b", Vec3::new(5.0, 0.0, 0.0), "Sentry");

        let result = GuardCommands::new(&mut sim)
            .handle("reset_guards", &["Sentry"])
            .expect("recognized");

        assert!(result.success);
        assert_eq!(position(&sim, a), Some(Vec3::X));
        assert_eq!(position(&sim, b), Some(Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_reset_guards_reports_props_and_empty_labels() {
        let mut sim = TestSim::new();
        let (prop, _) = sim.add_prop("statue", Transform::default());
        sim.tag(prop, "Guard").expect("prop exists");

        let mut commands = GuardCommands::new(&mut sim);
        let result = commands.handle("reset_guards", &[]).expect("recognized");
        assert_eq!(result.output.len(), 2);
        assert!(result.output[0].text.starts_with("Skipped 1"));

        let result = commands.handle("reset_guards", &["Nobody"]).expect("recognized");
        assert_eq!(result.output[0].level, OutputLevel::Warning);
        assert!(result.success);

        let result = commands
            .handle("reset_guards", &["a", "b"])
            .expect("recognized");
        assert!(!result.success);
    }

    #[test]
    fn test_guards_lists_state() {
        let mut sim = TestSim::new();
        let a = add_guard(&mut sim, "north", Vec3::ZERO, "Guard");
        add_guard(&mut sim, "south", Vec3::ZERO, "Sentry");

        let commands = GuardCommands::new(&mut sim);
        let all = commands.list_guards(&[]);
        assert_eq!(all.output.len(), 2);

        let guards = commands.list_guards(&["Guard"]);
        assert_eq!(guards.output.len(), 1);
        assert_eq!(
            guards.output[0].text,
            format!("{a} north: Patrol waypoint=0 wait=0.00 lost=0.00")
        );

        let none = commands.list_guards(&["Nobody"]);
        assert_eq!(none.output[0].text, "No guards.");
    }

    #[test]
    fn test_unrelated_commands_fall_through() {
        let mut sim = TestSim::new();
        assert!(GuardCommands::new(&mut sim).handle("spawn", &[]).is_none());
    }
}
