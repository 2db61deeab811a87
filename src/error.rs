/*
 * Error Module
 *
 * Errors raised while validating simulation parameters. Stepping itself never
 * fails, so this is the only error type the core exposes.
 */

use thiserror::Error;

/// Errors emitted when a `SimulationParams` value cannot drive a simulation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A scalar parameter that must be strictly positive was not.
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    /// A scalar parameter that must not be negative was.
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    /// Any other configuration value that cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
