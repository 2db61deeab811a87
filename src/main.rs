/*
 * Boid Flocking Viewer
 *
 * Opens a nannou window around a Simulation. Agents steer by separation,
 * alignment and cohesion towards the neighbours they can see.
 *
 * Left click spawns a boid, D shows fields of view, Space shows the density
 * map, P pauses. Set RUST_LOG to control log output.
 */

use flock_grid::app;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    nannou::app(app::model).update(app::update).run();
}
