/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that holds frame metrics and the
 * viewer's debug toggles. The toggles live here, on the host, rather than in
 * the simulation core.
 */

use std::time::Duration;

use crate::simulation::FlockStats;

// Debug information to display
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub tick: u64,
    pub stats: FlockStats,
    // Tint boids by neighbour count and draw their field of view
    pub show_debug: bool,
    // Draw the grid density heat map
    pub show_density: bool,
    pub paused: bool,
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: Duration::ZERO,
            tick: 0,
            stats: FlockStats::default(),
            show_debug: false,
            show_density: false,
            paused: false,
        }
    }
}
