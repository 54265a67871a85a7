//! Error types for Warden.

use crate::ids::AgentId;
use thiserror::Error;

/// Top-level error type for Warden operations.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Agent configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Simulation bookkeeping errors
    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),
}

/// Invalid agent or scenario configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Detection radius must be a positive, finite distance
    #[error("Detection radius must be positive, got {0}")]
    InvalidRadius(f32),

    /// View angle must lie in [0, 360] degrees
    #[error("View angle must be within 0..=360 degrees, got {0}")]
    InvalidViewAngle(f32),

    /// Lost-target grace must be a positive duration
    #[error("Lost-target grace must be positive, got {0}")]
    InvalidGrace(f32),

    /// Patrol wait must be non-negative
    #[error("Patrol wait must be non-negative, got {0}")]
    InvalidWait(f32),

    /// Arrival threshold must be positive
    #[error("Arrival threshold must be positive, got {0}")]
    InvalidArrival(f32),

    /// Simulation timestep must be positive
    #[error("Timestep must be positive, got {0}")]
    InvalidTimestep(f32),

    /// Scenario text could not be parsed
    #[error("Failed to parse scenario: {0}")]
    Parse(String),
}

/// Simulation registry errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// No agent with this id exists
    #[error("Agent not found: {0}")]
    NotFound(AgentId),

    /// An agent with this id is already registered
    #[error("Agent already registered: {0}")]
    AlreadyRegistered(AgentId),
}

/// Result type alias for Warden operations.
pub type WardenResult<T> = Result<T, WardenError>;
