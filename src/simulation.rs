/*
 * Simulation Module
 *
 * This module owns the agent arena, the spatial grid and the random number
 * generator, and advances the flock one tick at a time:
 *
 *   rebuild grid -> for each agent in arena order:
 *       find neighbours -> steer -> integrate -> update heading -> wrap
 *
 * Agents are updated in place. An agent scanned after its own update has
 * already moved, so later agents see earlier agents at their new positions.
 */

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::boid::Boid;
use crate::error::ConfigError;
use crate::params::SimulationParams;
use crate::spatial_grid::SpatialGrid;

pub struct Simulation {
    params: SimulationParams,
    agents: Vec<Boid>,
    grid: SpatialGrid,
    rng: SmallRng,
    tick: u64,
}

impl Simulation {
    /// Build a simulation and populate it with `params.initial_agents` boids.
    pub fn new(params: SimulationParams) -> Result<Self, ConfigError> {
        let mut simulation = Self::empty(params)?;
        let initial = simulation.params.initial_agents;
        simulation.spawn_random(initial);
        Ok(simulation)
    }

    /// Build a simulation with no agents.
    pub fn empty(params: SimulationParams) -> Result<Self, ConfigError> {
        params.validate()?;

        let rng = match params.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let grid = SpatialGrid::new(params.cell_size, params.world_width, params.world_height);

        info!(
            width = params.world_width,
            height = params.world_height,
            cell_size = params.cell_size,
            cols = grid.cols(),
            rows = grid.rows(),
            capacity = params.capacity,
            search = params.neighbor_search.label(),
            "simulation created"
        );

        Ok(Self {
            agents: Vec::with_capacity(params.capacity),
            params,
            grid,
            rng,
            tick: 0,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn agents(&self) -> &[Boid] {
        &self.agents
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.agents.len() >= self.params.capacity
    }

    /// Add a boid facing a random direction. Returns its index, or `None` when
    /// the simulation is already at capacity.
    pub fn spawn(&mut self, position: Vec2) -> Option<usize> {
        if self.is_full() {
            debug!(capacity = self.params.capacity, "spawn rejected at capacity");
            return None;
        }
        let boid = Boid::new(position, &self.params, &mut self.rng);
        self.insert(boid)
    }

    /// Add a prepared boid, subject to the same capacity rule as `spawn`.
    pub fn insert(&mut self, boid: Boid) -> Option<usize> {
        if self.is_full() {
            debug!(capacity = self.params.capacity, "spawn rejected at capacity");
            return None;
        }
        self.agents.push(boid);
        Some(self.agents.len() - 1)
    }

    /// Spawn up to `count` boids at random positions inside the world.
    /// Returns how many were actually created.
    pub fn spawn_random(&mut self, count: usize) -> usize {
        let mut spawned = 0;
        for _ in 0..count {
            let position = Vec2::new(
                self.rng.gen_range(0.0..self.params.world_width),
                self.rng.gen_range(0.0..self.params.world_height),
            );
            if self.spawn(position).is_none() {
                break;
            }
            spawned += 1;
        }

        info!(requested = count, spawned, total = self.agents.len(), "random flock spawned");
        spawned
    }

    /// Advance every agent by one tick of `dt_ms` milliseconds. A negative or
    /// non-finite `dt_ms` is ignored and the tick does not happen.
    pub fn step(&mut self, dt_ms: f32) {
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            warn!(dt_ms, "ignoring step with invalid elapsed time");
            return;
        }

        let indexed = self.grid.rebuild(self.agents.iter().map(|boid| boid.position));

        let params = &self.params;
        for index in 0..self.agents.len() {
            self.agents[index].begin_tick();

            let scan = Boid::find_neighbors(&self.agents, index, &self.grid, params);
            self.agents[index].set_neighbors(scan);

            let steering = self.agents[index].compute_steering(&self.agents, params);

            let boid = &mut self.agents[index];
            boid.flock(&steering, params);
            boid.integrate(dt_ms);
            boid.update_heading();
            boid.wrap_position(params.world_width, params.world_height, params.agent_extent);
        }

        self.tick += 1;

        if tracing::enabled!(tracing::Level::DEBUG) {
            let stats = self.stats();
            debug!(
                tick = self.tick,
                agents = self.agents.len(),
                indexed,
                with_neighbors = stats.agents_with_neighbors,
                mean_neighbors = stats.mean_neighbors,
                "tick complete"
            );
        }
    }

    /// Aggregate figures over the current flock.
    pub fn stats(&self) -> FlockStats {
        let agents = self.agents.len();
        if agents == 0 {
            return FlockStats::default();
        }

        let with_neighbors = self.agents.iter().filter(|boid| boid.has_neighbors()).count();
        let neighbor_total: usize = self.agents.iter().map(Boid::neighbor_count).sum();
        let speed_total: f32 = self.agents.iter().map(|boid| boid.velocity.length()).sum();

        FlockStats {
            agents,
            agents_with_neighbors: with_neighbors,
            mean_neighbors: neighbor_total as f32 / agents as f32,
            mean_speed: speed_total / agents as f32,
        }
    }

    /// Row-major density field of the grid as rebuilt at the start of the last tick.
    pub fn density_map(&self) -> Vec<f32> {
        self.grid
            .density_map(self.params.density_neighbor_weight, self.params.density_divisor)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlockStats {
    pub agents: usize,
    pub agents_with_neighbors: usize,
    pub mean_neighbors: f32,
    pub mean_speed: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(capacity: usize, initial_agents: usize) -> Simulation {
        Simulation::new(SimulationParams {
            capacity,
            initial_agents,
            seed: Some(7),
            ..SimulationParams::default()
        })
        .unwrap()
    }

    #[test]
    fn new_spawns_the_initial_flock_inside_the_world() {
        let sim = seeded(600, 150);
        assert_eq!(sim.len(), 150);
        assert!(sim.agents().iter().all(|boid| {
            (0.0..1000.0).contains(&boid.position.x) && (0.0..1000.0).contains(&boid.position.y)
        }));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let result = Simulation::new(SimulationParams {
            detection_range: -1.0,
            ..SimulationParams::default()
        });
        assert!(matches!(
            result,
            Err(ConfigError::NotPositive { name: "detection_range", .. })
        ));
    }

    #[test]
    fn spawning_stops_at_capacity() {
        let mut sim = seeded(3, 0);
        assert_eq!(sim.spawn(Vec2::new(1.0, 1.0)), Some(0));
        assert_eq!(sim.spawn_random(5), 2);
        assert!(sim.is_full());
        assert_eq!(sim.spawn(Vec2::new(2.0, 2.0)), None);
        assert_eq!(sim.len(), 3);
    }

    #[test]
    fn same_seed_gives_same_flock() {
        let mut a = seeded(100, 60);
        let mut b = seeded(100, 60);
        for _ in 0..20 {
            a.step(16.0);
            b.step(16.0);
        }
        for (left, right) in a.agents().iter().zip(b.agents()) {
            assert_eq!(left.position, right.position);
            assert_eq!(left.neighbors(), right.neighbors());
        }
        assert_eq!(a.tick(), 20);
    }

    #[test]
    fn step_rebuilds_grid_from_pre_tick_positions() {
        let mut sim = seeded(10, 0);
        sim.spawn(Vec2::new(510.0, 510.0));
        sim.step(16.0);
        assert_eq!(sim.grid().agents_in_cell(20, 20), &[0]);
    }

    #[test]
    fn invalid_elapsed_time_is_ignored() {
        let mut sim = seeded(10, 5);
        let before: Vec<Vec2> = sim.agents().iter().map(|boid| boid.position).collect();

        sim.step(f32::NAN);
        sim.step(f32::INFINITY);
        sim.step(-16.0);

        assert_eq!(sim.tick(), 0);
        let after: Vec<Vec2> = sim.agents().iter().map(|boid| boid.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn huge_elapsed_time_keeps_agents_inside_wrap_bounds() {
        let mut sim = seeded(50, 50);
        sim.step(100_000.0);

        let extent = sim.params().agent_extent;
        for boid in sim.agents() {
            assert!(boid.position.x >= -extent && boid.position.x <= 1000.0 + extent);
            assert!(boid.position.y >= -extent && boid.position.y <= 1000.0 + extent);
        }
    }

    #[test]
    fn stats_on_empty_flock_are_zero() {
        let sim = seeded(10, 0);
        assert_eq!(sim.stats(), FlockStats::default());
        assert!(sim.is_empty());
    }
}
