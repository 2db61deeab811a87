/*
 * Boid Module
 *
 * This module defines the Boid struct and its behavior.
 * Each boid follows three main rules:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * A boid only reacts to neighbours it can see: anything within detection range
 * that is not inside the rear blind-spot wedge. Neighbours are stored as
 * indices into the simulation's agent arena and recomputed every tick.
 */

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;

use crate::params::{NeighborSearch, SimulationParams};
use crate::spatial_grid::SpatialGrid;

/// Rescale `v` to exactly `max_length` when it is longer. Zero vectors are
/// returned untouched.
#[inline]
pub fn limit(v: Vec2, max_length: f32) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > max_length * max_length && length_squared > 0.0 {
        v * (max_length / length_squared.sqrt())
    } else {
        v
    }
}

#[inline]
fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

// True when `b` lies clockwise of `a` (sign of the 2-D cross product)
#[inline]
fn is_clockwise(a: Vec2, b: Vec2) -> bool {
    -a.x * b.y + a.y * b.x > 0.0
}

/// The three raw steering forces of one tick, each already clamped to `max_force`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    pub separation: Vec2,
    pub alignment: Vec2,
    pub cohesion: Vec2,
}

impl Steering {
    pub fn weighted(&self, params: &SimulationParams) -> Vec2 {
        self.separation * params.separation_weight
            + self.alignment * params.alignment_weight
            + self.cohesion * params.cohesion_weight
    }
}

/// Result of a neighbour search for one agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborScan {
    /// Admitted neighbours in arena order.
    pub neighbors: Vec<usize>,
    /// Agents found in the grid window around the agent, self included.
    pub candidates: usize,
}

#[derive(Debug, Clone)]
pub struct Boid {
    pub position: Vec2,
    pub previous_position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub heading: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub base_speed: f32,
    neighbors: Vec<usize>,
    has_neighbors: bool,
    grid_candidates: usize,
}

impl Boid {
    /// A boid at `position` facing a random direction at unit speed.
    pub fn new<R: Rng + ?Sized>(position: Vec2, params: &SimulationParams, rng: &mut R) -> Self {
        let heading = rng.gen_range(0.0..TAU);
        let mut boid = Self::with_velocity(position, direction(heading), params);
        boid.heading = heading;
        boid
    }

    /// A boid with a known starting velocity; the heading follows the velocity.
    pub fn with_velocity(position: Vec2, velocity: Vec2, params: &SimulationParams) -> Self {
        let heading = if velocity.length_squared() > 0.0 {
            velocity.y.atan2(velocity.x)
        } else {
            0.0
        };

        Self {
            position,
            previous_position: position,
            velocity,
            acceleration: Vec2::ZERO,
            heading,
            max_speed: params.max_speed,
            max_force: params.max_force,
            base_speed: params.base_speed,
            neighbors: Vec::new(),
            has_neighbors: false,
            grid_candidates: 0,
        }
    }

    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn has_neighbors(&self) -> bool {
        self.has_neighbors
    }

    pub fn grid_candidates(&self) -> usize {
        self.grid_candidates
    }

    /// Whether `point` falls inside the rear wedge this boid cannot see. The
    /// wedge spans `half_angle` either side of the direction opposite the heading.
    pub fn in_blind_spot(&self, point: Vec2, half_angle: f32) -> bool {
        let relative = point - self.position;
        let first_ray = direction(self.heading + PI - half_angle);
        let second_ray = direction(self.heading + PI + half_angle);

        !is_clockwise(first_ray, relative) && is_clockwise(second_ray, relative)
    }

    /// Find the agents visible to `agents[index]` this tick.
    ///
    /// Reads the arena as it currently stands, so agents updated earlier in the
    /// tick are seen at their new positions.
    pub fn find_neighbors(
        agents: &[Boid],
        index: usize,
        grid: &SpatialGrid,
        params: &SimulationParams,
    ) -> NeighborScan {
        let me = &agents[index];
        let cell_radius = params.cell_radius();

        let range_squared = params.detection_range * params.detection_range;
        let half_angle = params.blind_spot_half_angle();
        let visible = |&other_index: &usize| {
            if other_index == index {
                return false;
            }
            let other = agents[other_index].position;
            me.position.distance_squared(other) < range_squared
                && !me.in_blind_spot(other, half_angle)
        };

        match params.neighbor_search {
            NeighborSearch::FullScan => NeighborScan {
                neighbors: (0..agents.len()).filter(visible).collect(),
                candidates: grid.count_near(me.position, cell_radius),
            },
            NeighborSearch::GridWindow => {
                let candidates = grid.candidates_near(me.position, cell_radius);
                let mut found: Vec<usize> = candidates.iter().copied().filter(visible).collect();
                // buckets are visited cell by cell; restore arena order
                found.sort_unstable();
                NeighborScan {
                    neighbors: found,
                    candidates: candidates.len(),
                }
            }
        }
    }

    /// Replace this tick's neighbour list.
    pub fn set_neighbors(&mut self, scan: NeighborScan) {
        self.has_neighbors = !scan.neighbors.is_empty();
        self.grid_candidates = scan.candidates;
        self.neighbors = scan.neighbors;
    }

    pub fn compute_steering(&self, agents: &[Boid], params: &SimulationParams) -> Steering {
        Steering {
            separation: self.separation(agents, params.desired_separation),
            alignment: self.alignment(agents, params.detection_range),
            cohesion: self.cohesion(agents, params.detection_range),
        }
    }

    // Apply a force to the boid
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Accumulate the weighted steering into this tick's acceleration.
    pub fn flock(&mut self, steering: &Steering, params: &SimulationParams) {
        self.apply_force(steering.weighted(params));
    }

    // Calculate separation force (avoid crowding neighbors)
    pub fn separation(&self, agents: &[Boid], desired_separation: f32) -> Vec2 {
        let mut steering = Vec2::ZERO;
        let mut count = 0;

        for &i in &self.neighbors {
            let other = &agents[i];
            let d = self.position.distance(other.position);

            if d > 0.0 && d < desired_separation {
                // Pointing away from the neighbour, stronger when closer
                let diff = (self.position - other.position).normalize() / d;
                steering += diff;
                count += 1;
            }
        }

        if count > 0 {
            steering /= count as f32;
        }

        if steering.length_squared() > 0.0 {
            // Reynolds: Steering = Desired - Velocity
            steering = limit(steering.normalize() * self.max_speed - self.velocity, self.max_force);
        }

        steering
    }

    // Calculate alignment force (steer towards average heading of neighbors)
    pub fn alignment(&self, agents: &[Boid], detection_range: f32) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0;

        for &i in &self.neighbors {
            let other = &agents[i];
            let d = self.position.distance(other.position);

            if d > 0.0 && d < detection_range {
                sum += other.velocity;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }

        sum /= count as f32;
        // Velocities that cancel out give no preferred direction
        if sum.length_squared() == 0.0 {
            return Vec2::ZERO;
        }

        let desired = sum.normalize() * self.max_speed;
        limit(desired - self.velocity, self.max_force)
    }

    // Calculate cohesion force (steer towards average position of neighbors)
    pub fn cohesion(&self, agents: &[Boid], detection_range: f32) -> Vec2 {
        let mut sum = Vec2::ZERO;
        let mut count = 0;

        for &i in &self.neighbors {
            let other = &agents[i];
            let d = self.position.distance(other.position);

            if d > 0.0 && d < detection_range {
                sum += other.position;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }

        self.seek(sum / count as f32)
    }

    /// Steering force towards `target` at full speed.
    pub fn seek(&self, target: Vec2) -> Vec2 {
        let desired = (target - self.position).normalize_or_zero() * self.max_speed;
        limit(desired - self.velocity, self.max_force)
    }

    // Remember where this tick started so the heading can be derived afterwards
    pub fn begin_tick(&mut self) {
        self.previous_position = self.position;
    }

    /// Advance by `dt_ms` milliseconds and clear the acceleration.
    pub fn integrate(&mut self, dt_ms: f32) {
        self.velocity += self.acceleration;
        self.velocity = limit(self.velocity, self.max_speed);
        self.position += self.velocity * self.base_speed * dt_ms;
        self.acceleration = Vec2::ZERO;
    }

    /// Point the heading along this tick's displacement. A boid that did not
    /// move keeps its previous heading.
    pub fn update_heading(&mut self) {
        let travelled = self.position - self.previous_position;
        if travelled.length_squared() > 0.0 {
            self.heading = travelled.y.atan2(travelled.x);
        }
    }

    /// Wrap the boid around the world edges. The boundary sits `extent` outside
    /// the world; a boid that crosses it re-enters past the opposite boundary by
    /// the same overshoot, modulo the wrapped span.
    pub fn wrap_position(&mut self, width: f32, height: f32, extent: f32) {
        self.position.x = wrap_axis(self.position.x, width, extent);
        self.position.y = wrap_axis(self.position.y, height, extent);
    }
}

#[inline]
fn wrap_axis(value: f32, size: f32, extent: f32) -> f32 {
    if value > size + extent || value < -extent {
        let span = size + 2.0 * extent;
        (value + extent).rem_euclid(span) - extent
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn params() -> SimulationParams {
        SimulationParams::default()
    }

    fn boid_at(x: f32, y: f32, vx: f32, vy: f32) -> Boid {
        Boid::with_velocity(Vec2::new(x, y), Vec2::new(vx, vy), &params())
    }

    fn scan(agents: &[Boid], index: usize, params: &SimulationParams) -> NeighborScan {
        let mut grid = SpatialGrid::new(params.cell_size, params.world_width, params.world_height);
        grid.rebuild(agents.iter().map(|boid| boid.position));
        Boid::find_neighbors(agents, index, &grid, params)
    }

    fn detect_all(agents: &mut [Boid], params: &SimulationParams) {
        for index in 0..agents.len() {
            let found = scan(agents, index, params);
            agents[index].set_neighbors(found);
        }
    }

    #[test]
    fn limit_rescales_long_vectors_only() {
        let clamped = limit(Vec2::new(3.0, 4.0), 1.0);
        assert_relative_eq!(clamped.length(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(clamped.x, 0.6, epsilon = 1e-6);

        assert_eq!(limit(Vec2::new(0.3, 0.4), 1.0), Vec2::new(0.3, 0.4));
        assert_eq!(limit(Vec2::ZERO, 0.0), Vec2::ZERO);
    }

    #[test]
    fn random_boid_moves_along_its_heading() {
        let mut rng = SmallRng::seed_from_u64(3);
        let boid = Boid::new(Vec2::new(10.0, 20.0), &params(), &mut rng);
        assert_relative_eq!(boid.velocity.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(boid.velocity.x, boid.heading.cos(), epsilon = 1e-5);
        assert_eq!(boid.acceleration, Vec2::ZERO);
        assert!(boid.neighbors().is_empty());
    }

    #[test]
    fn neighbour_behind_is_hidden_and_ahead_is_seen() {
        let params = params();
        let mut agents = vec![
            boid_at(500.0, 500.0, 1.0, 0.0),
            boid_at(450.0, 500.0, 1.0, 0.0),
        ];
        assert_eq!(agents[0].heading, 0.0);
        assert!(scan(&agents, 0, &params).neighbors.is_empty());

        agents[1].position = Vec2::new(550.0, 500.0);
        assert_eq!(scan(&agents, 0, &params).neighbors, vec![1]);
    }

    #[test]
    fn blind_spot_spans_thirty_degrees_either_side_of_rear() {
        let boid = boid_at(0.0, 0.0, 1.0, 0.0);
        let half_angle = params().blind_spot_half_angle();
        let at = |deg: f32| direction(deg.to_radians()) * 50.0;

        assert!(boid.in_blind_spot(at(180.0), half_angle));
        assert!(boid.in_blind_spot(at(155.0), half_angle));
        assert!(boid.in_blind_spot(at(205.0), half_angle));
        assert!(!boid.in_blind_spot(at(140.0), half_angle));
        assert!(!boid.in_blind_spot(at(220.0), half_angle));
        assert!(!boid.in_blind_spot(at(90.0), half_angle));
        assert!(!boid.in_blind_spot(at(0.0), half_angle));
    }

    #[test]
    fn blind_spot_turns_with_heading() {
        let boid = boid_at(0.0, 0.0, 0.0, 1.0);
        let half_angle = params().blind_spot_half_angle();
        assert!(boid.in_blind_spot(Vec2::new(0.0, -30.0), half_angle));
        assert!(!boid.in_blind_spot(Vec2::new(0.0, 30.0), half_angle));
        assert!(!boid.in_blind_spot(Vec2::new(-30.0, 0.0), half_angle));
    }

    #[test]
    fn neighbours_exclude_self_and_out_of_range() {
        let params = params();
        let agents = vec![
            boid_at(500.0, 500.0, 1.0, 0.0),
            boid_at(599.0, 500.0, 0.0, 1.0),
            boid_at(600.5, 500.0, 0.0, 1.0),
            boid_at(500.0, 430.0, 0.0, 1.0),
        ];
        let found = scan(&agents, 0, &params);
        assert_eq!(found.neighbors, vec![1, 3]);
        assert!(found.candidates >= 4);
    }

    #[test]
    fn grid_window_search_matches_full_scan() {
        let full = params();
        let windowed = SimulationParams {
            neighbor_search: NeighborSearch::GridWindow,
            ..params()
        };
        let mut rng = SmallRng::seed_from_u64(11);
        let agents: Vec<Boid> = (0..200)
            .map(|_| {
                let position = Vec2::new(rng.gen_range(0.0..400.0), rng.gen_range(0.0..400.0));
                Boid::new(position, &full, &mut rng)
            })
            .collect();

        for index in 0..agents.len() {
            assert_eq!(
                scan(&agents, index, &full).neighbors,
                scan(&agents, index, &windowed).neighbors
            );
        }
    }

    #[test]
    fn isolated_boid_feels_no_force() {
        let params = params();
        let mut agents = vec![boid_at(100.0, 100.0, 1.0, 0.0), boid_at(800.0, 800.0, 1.0, 0.0)];
        detect_all(&mut agents, &params);

        assert!(!agents[0].has_neighbors());
        let steering = agents[0].compute_steering(&agents, &params);
        assert_eq!(steering, Steering::default());

        agents[0].flock(&steering, &params);
        assert_eq!(agents[0].acceleration, Vec2::ZERO);
    }

    #[test]
    fn coincident_neighbour_adds_no_separation() {
        let params = params();
        let mut agents = vec![boid_at(200.0, 200.0, 1.0, 0.0), boid_at(200.0, 200.0, 1.0, 0.0)];
        detect_all(&mut agents, &params);

        let steering = agents[0].compute_steering(&agents, &params);
        assert_eq!(steering.separation, Vec2::ZERO);
        assert!(steering.cohesion.is_finite());
        assert!(steering.alignment.is_finite());
    }

    #[test]
    fn every_rule_stays_within_max_force() {
        let params = params();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut agents: Vec<Boid> = (0..120)
            .map(|_| {
                let position = Vec2::new(rng.gen_range(300.0..500.0), rng.gen_range(300.0..500.0));
                Boid::new(position, &params, &mut rng)
            })
            .collect();
        detect_all(&mut agents, &params);

        for boid in &agents {
            let steering = boid.compute_steering(&agents, &params);
            for force in [steering.separation, steering.alignment, steering.cohesion] {
                assert!(force.length() <= params.max_force + 1e-6);
            }
        }
        assert!(agents.iter().any(|boid| boid.has_neighbors()));
    }

    #[test]
    fn opposing_neighbour_velocities_give_no_alignment() {
        let params = params();
        let mut agents = vec![
            boid_at(500.0, 500.0, 1.0, 0.0),
            boid_at(520.0, 500.0, 0.0, 1.0),
            boid_at(520.0, 510.0, 0.0, -1.0),
        ];
        detect_all(&mut agents, &params);

        assert_eq!(agents[0].neighbors(), &[1, 2]);
        assert_eq!(agents[0].alignment(&agents, params.detection_range), Vec2::ZERO);
    }

    #[test]
    fn full_scan_counts_window_candidates() {
        let params = params();
        let agents = vec![
            boid_at(500.0, 500.0, 1.0, 0.0),
            boid_at(520.0, 500.0, 0.0, 1.0),
            boid_at(900.0, 900.0, 0.0, 1.0),
        ];
        assert_eq!(scan(&agents, 0, &params).candidates, 2);
    }

    #[test]
    fn seek_points_at_target() {
        let boid = boid_at(0.0, 0.0, 0.0, 0.0);
        let force = boid.seek(Vec2::new(0.0, 50.0));
        assert_relative_eq!(force.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(force.y, params().max_force, epsilon = 1e-6);
        assert_eq!(boid.seek(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn integrate_caps_speed_and_clears_acceleration() {
        let mut boid = boid_at(100.0, 100.0, 1.0, 0.0);
        boid.apply_force(Vec2::new(10.0, 10.0));
        boid.integrate(16.0);

        assert!(boid.velocity.length() <= boid.max_speed + 1e-5);
        assert_eq!(boid.acceleration, Vec2::ZERO);

        let step = boid.velocity * boid.base_speed * 16.0;
        assert_relative_eq!(boid.position.x, 100.0 + step.x, epsilon = 1e-4);
        assert_relative_eq!(boid.position.y, 100.0 + step.y, epsilon = 1e-4);
    }

    #[test]
    fn heading_follows_displacement() {
        let mut boid = boid_at(100.0, 100.0, 0.0, 1.0);
        boid.begin_tick();
        boid.integrate(10.0);
        boid.update_heading();
        assert_relative_eq!(boid.heading, PI / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn heading_is_kept_when_boid_does_not_move() {
        let mut boid = boid_at(100.0, 100.0, -1.0, 0.0);
        boid.velocity = Vec2::ZERO;
        boid.begin_tick();
        boid.integrate(16.0);
        boid.update_heading();
        assert_relative_eq!(boid.heading, PI, epsilon = 1e-6);
    }

    #[test]
    fn wrap_preserves_overshoot_on_every_edge() {
        let (width, height, extent) = (1000.0, 800.0, 20.0);
        let wrapped = |x: f32, y: f32| {
            let mut boid = boid_at(x, y, 0.0, 0.0);
            boid.wrap_position(width, height, extent);
            boid.position
        };

        assert_eq!(wrapped(1021.0, 400.0), Vec2::new(-19.0, 400.0));
        assert_eq!(wrapped(-21.0, 400.0), Vec2::new(1019.0, 400.0));
        assert_eq!(wrapped(500.0, 821.0), Vec2::new(500.0, -19.0));
        assert_eq!(wrapped(500.0, -21.0), Vec2::new(500.0, 819.0));
        // inside the margin nothing happens yet
        assert_eq!(wrapped(1005.0, -5.0), Vec2::new(1005.0, -5.0));
    }

    #[test]
    fn wrap_brings_far_outside_positions_back_in_one_call() {
        let mut boid = boid_at(-4000.0, 3000.0, 0.0, 0.0);
        boid.wrap_position(1000.0, 1000.0, 20.0);
        assert!((-20.0..=1020.0).contains(&boid.position.x));
        assert!((-20.0..=1020.0).contains(&boid.position.y));
        // -4000 + 4 * 1040 and 3000 - 2 * 1040
        assert_relative_eq!(boid.position.x, 160.0, epsilon = 1e-3);
        assert_relative_eq!(boid.position.y, 920.0, epsilon = 1e-3);
    }
}
