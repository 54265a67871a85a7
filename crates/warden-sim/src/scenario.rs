//! Scenario files.
//!
//! A scenario describes the guards, the target, static obstacles, run
//! settings and console commands to execute at given times. Scenarios are
//! TOML; every section is optional and falls back to a small demo layout.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};
use warden_ai::config::AgentConfig;
use warden_ai::obstacles::Obstacle;
use warden_ai::steering::DEFAULT_SPEED;
use warden_common::{ConfigError, LayerMask};
use warden_tools::console::ConsoleConfig;
use warden_tools::guard_commands::DEFAULT_GUARD_LABEL;

/// Scenario file name used when none is given.
pub const SCENARIO_FILE: &str = "warden.toml";

/// Run loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Simulated seconds
    pub duration: f32,
    /// Fixed timestep in seconds
    pub fixed_dt: f32,
    /// Log detection gizmos at debug level
    pub log_gizmos: bool,
    /// Seconds between gizmo dumps
    pub gizmo_interval: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            duration: 30.0,
            fixed_dt: 0.1,
            log_gizmos: false,
            gizmo_interval: 1.0,
        }
    }
}

/// One guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSpec {
    /// Display name
    pub name: String,
    /// Labels for batch commands
    pub labels: Vec<String>,
    /// Spawn position (defaults to the first waypoint)
    pub position: Option<Vec3>,
    /// Initial facing as yaw in degrees (0 faces +Z)
    pub yaw_degrees: f32,
    /// Patrol route
    pub waypoints: Vec<Vec3>,
    /// Walking speed
    pub speed: f32,
    /// Perception and patrol tuning
    pub config: AgentConfig,
}

impl Default for GuardSpec {
    fn default() -> Self {
        Self {
            name: "guard".to_string(),
            labels: vec![DEFAULT_GUARD_LABEL.to_string()],
            position: None,
            yaw_degrees: 0.0,
            waypoints: Vec::new(),
            speed: DEFAULT_SPEED,
            config: AgentConfig::default(),
        }
    }
}

impl GuardSpec {
    /// Where the guard spawns.
    #[must_use]
    pub fn spawn_position(&self) -> Vec3 {
        self.position
            .or_else(|| self.waypoints.first().copied())
            .unwrap_or(Vec3::ZERO)
    }
}

/// The body guards chase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSpec {
    /// Display name
    pub name: String,
    /// Spawn position
    pub position: Vec3,
    /// Looping route; empty means the target stands still
    pub route: Vec<Vec3>,
    /// Walking speed
    pub speed: f32,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            name: "player".to_string(),
            position: Vec3::ZERO,
            route: Vec::new(),
            speed: 2.0,
        }
    }
}

/// Static geometry. `layer` is a layer index; obstacles default to the
/// obstacle layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ObstacleSpec {
    /// Axis-aligned box
    Box {
        /// One corner
        min: Vec3,
        /// Opposite corner
        max: Vec3,
        /// Layer index
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layer: Option<u32>,
    },
    /// Sphere
    Sphere {
        /// Center
        center: Vec3,
        /// Radius
        radius: f32,
        /// Layer index
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layer: Option<u32>,
    },
}

impl ObstacleSpec {
    /// Builds the runtime obstacle.
    #[must_use]
    pub fn to_obstacle(&self) -> Obstacle {
        let (obstacle, layer) = match *self {
            ObstacleSpec::Box { min, max, layer } => (Obstacle::wall(min, max), layer),
            ObstacleSpec::Sphere {
                center,
                radius,
                layer,
            } => (Obstacle::sphere(center, radius), layer),
        };
        match layer {
            Some(index) => obstacle.on_layer(LayerMask::layer(index)),
            None => obstacle,
        }
    }
}

/// Console command run once simulated time reaches `at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledCommand {
    /// Simulated seconds
    pub at: f32,
    /// Command line
    pub command: String,
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Run loop settings
    pub run: RunSettings,
    /// Developer console settings
    pub console: ConsoleConfig,
    /// Guards
    pub guards: Vec<GuardSpec>,
    /// Target
    pub target: Option<TargetSpec>,
    /// Static geometry
    pub obstacles: Vec<ObstacleSpec>,
    /// Console commands by time
    pub commands: Vec<ScheduledCommand>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            run: RunSettings::default(),
            console: ConsoleConfig::default(),
            guards: vec![
                GuardSpec {
                    name: "north".to_string(),
                    waypoints: vec![
                        Vec3::new(0.0, 0.0, 0.0),
                        Vec3::new(20.0, 0.0, 0.0),
                        Vec3::new(20.0, 0.0, 20.0),
                    ],
                    ..GuardSpec::default()
                },
                GuardSpec {
                    name: "gate".to_string(),
                    labels: vec![DEFAULT_GUARD_LABEL.to_string(), "Sentry".to_string()],
                    yaw_degrees: 180.0,
                    waypoints: vec![Vec3::new(10.0, 0.0, 30.0)],
                    ..GuardSpec::default()
                },
            ],
            target: Some(TargetSpec {
                position: Vec3::new(30.0, 0.0, 10.0),
                route: vec![Vec3::new(30.0, 0.0, 10.0), Vec3::new(-10.0, 0.0, 10.0)],
                ..TargetSpec::default()
            }),
            obstacles: vec![ObstacleSpec::Box {
                min: Vec3::new(8.0, 0.0, 14.0),
                max: Vec3::new(12.0, 3.0, 15.0),
                layer: None,
            }],
            commands: vec![
                ScheduledCommand {
                    at: 10.0,
                    command: "guards".to_string(),
                },
                ScheduledCommand {
                    at: 15.0,
                    command: "reset_guards".to_string(),
                },
                ScheduledCommand {
                    at: 15.0,
                    command: "guards".to_string(),
                },
            ],
        }
    }
}

impl Scenario {
    /// Parses and validates scenario text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let scenario: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load a scenario from a specific path.
    /// Returns the default scenario if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!("Scenario file {} not found, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read scenario file: {e}");
                return Self::default();
            },
        };

        match Self::parse(&contents) {
            Ok(scenario) => {
                info!("Loaded scenario from {}", path.display());
                scenario
            },
            Err(e) => {
                warn!("Invalid scenario file: {e}");
                Self::default()
            },
        }
    }

    /// Save the scenario to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved scenario to {}", path.display());
        Ok(())
    }

    /// Checks run settings and every guard's configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.run.fixed_dt.is_finite() && self.run.fixed_dt > 0.0) {
            return Err(ConfigError::InvalidTimestep(self.run.fixed_dt));
        }
        for guard in &self.guards {
            guard.config.validate()?;
        }
        Ok(())
    }

    /// Commands ordered by time, stable for equal times.
    #[must_use]
    pub fn schedule(&self) -> Vec<ScheduledCommand> {
        let mut commands = self.commands.clone();
        commands.sort_by(|a, b| a.at.total_cmp(&b.at));
        commands
    }
}
