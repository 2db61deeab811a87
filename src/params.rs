/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that holds every constant the
 * simulation is built from. Values are fixed once a Simulation is constructed;
 * hosts may load overrides from JSON before that point.
 */

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How an agent gathers the agents it tests for neighbour admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSearch {
    /// Test every agent in the arena; the grid window is queried but only counted.
    #[default]
    FullScan,
    /// Test only the agents bucketed in the grid window around the agent.
    GridWindow,
}

impl NeighborSearch {
    pub fn label(self) -> &'static str {
        match self {
            NeighborSearch::FullScan => "full scan",
            NeighborSearch::GridWindow => "grid window",
        }
    }
}

// Parameters for the simulation, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub world_width: f32,
    pub world_height: f32,
    pub cell_size: f32,
    pub capacity: usize,
    pub initial_agents: usize,
    pub detection_range: f32,
    pub desired_separation: f32,
    pub max_speed: f32,
    pub max_force: f32,
    // Scales velocity into world units per millisecond
    pub base_speed: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    // Half of the rear wedge an agent cannot see, centred directly behind it
    pub blind_spot_half_angle_deg: f32,
    // Visual size of an agent; the wrap boundary sits this far outside the world
    pub agent_extent: f32,
    pub density_neighbor_weight: f32,
    pub density_divisor: f32,
    pub neighbor_search: NeighborSearch,
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            world_width: 1000.0,
            world_height: 1000.0,
            cell_size: 25.0,
            capacity: 600,
            initial_agents: 150,
            detection_range: 100.0,
            desired_separation: 90.0,
            max_speed: 1.5,
            max_force: 0.03,
            base_speed: 0.1,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            blind_spot_half_angle_deg: 30.0,
            agent_extent: 20.0,
            density_neighbor_weight: 1.4,
            density_divisor: 5.0,
            neighbor_search: NeighborSearch::FullScan,
            seed: None,
        }
    }
}

impl SimulationParams {
    /// Check every value the stepper divides by or compares against.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("cell_size", self.cell_size),
            ("detection_range", self.detection_range),
            ("max_speed", self.max_speed),
            ("base_speed", self.base_speed),
            ("density_neighbor_weight", self.density_neighbor_weight),
            ("density_divisor", self.density_divisor),
        ];
        for (name, value) in positive {
            // Written this way so NaN is rejected too
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let non_negative = [
            ("desired_separation", self.desired_separation),
            ("max_force", self.max_force),
            ("separation_weight", self.separation_weight),
            ("alignment_weight", self.alignment_weight),
            ("cohesion_weight", self.cohesion_weight),
            ("agent_extent", self.agent_extent),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        if self.cell_size > self.world_width || self.cell_size > self.world_height {
            return Err(ConfigError::InvalidConfig(
                "cell_size must not exceed the world dimensions",
            ));
        }
        if !(0.0..90.0).contains(&self.blind_spot_half_angle_deg) {
            return Err(ConfigError::InvalidConfig(
                "blind_spot_half_angle_deg must lie in [0, 90)",
            ));
        }
        if self.capacity == 0 {
            return Err(ConfigError::InvalidConfig("capacity must be at least 1"));
        }
        if self.initial_agents > self.capacity {
            return Err(ConfigError::InvalidConfig(
                "initial_agents must not exceed capacity",
            ));
        }
        Ok(())
    }

    /// Number of grid cells on each side of an agent's own cell that can hold
    /// agents within detection range.
    ///
    /// This is `ceil(detection_range / cell_size)`. It equals the floor when the
    /// range is a whole number of cells (100 / 25 by default); otherwise the
    /// floor would leave part of the detection disc outside the window.
    pub fn cell_radius(&self) -> usize {
        (self.detection_range / self.cell_size).ceil() as usize
    }

    pub fn blind_spot_half_angle(&self) -> f32 {
        self.blind_spot_half_angle_deg.to_radians()
    }
}
