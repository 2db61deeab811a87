/*
 * Boid Flocking Simulation - Module Definitions
 *
 * The core (boid, spatial_grid, simulation, params, error) has no graphics
 * dependency. The viewer modules are compiled with the `viewer` feature and
 * host the core in a nannou window.
 */

// Re-export key components for easier access
pub use boid::{Boid, NeighborScan, Steering};
pub use error::ConfigError;
pub use params::{NeighborSearch, SimulationParams};
pub use simulation::{FlockStats, Simulation};
pub use spatial_grid::SpatialGrid;

pub use glam;

// Define modules
pub mod boid;
pub mod error;
pub mod params;
pub mod simulation;
pub mod spatial_grid;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod camera;
#[cfg(feature = "viewer")]
pub mod debug;
#[cfg(feature = "viewer")]
pub mod input;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;
