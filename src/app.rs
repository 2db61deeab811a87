/*
 * Application Module
 *
 * This module defines the viewer's model and per-frame update. The viewer is a
 * host around a Simulation: it steps the flock once per frame with the frame's
 * elapsed time, forwards clicks as spawns and keeps the debug toggles.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::warn;

use crate::camera::Camera;
use crate::debug::DebugInfo;
use crate::input;
use crate::params::SimulationParams;
use crate::renderer;
use crate::simulation::Simulation;
use crate::ui;

// Frames slower than this are stepped as if they took this long
const MAX_FRAME_MS: f32 = 100.0;

// Main model for the application
pub struct Model {
    pub simulation: Simulation,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub camera: Camera,
    pub mouse_position: Vec2,
}

/// Build the viewer model from `SimulationParams::default()`.
pub fn model(app: &App) -> Model {
    model_with_params(app, SimulationParams::default())
}

pub fn model_with_params(app: &App, params: SimulationParams) -> Model {
    let simulation = match Simulation::new(params) {
        Ok(simulation) => simulation,
        Err(err) => {
            warn!(error = %err, "invalid parameters, falling back to defaults");
            Simulation::new(SimulationParams::default())
                .expect("default parameters are valid")
        }
    };

    let params = simulation.params();
    let window_id = app
        .new_window()
        .title("Boid Flocking Simulation")
        .size(params.world_width as u32, params.world_height as u32)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .mouse_pressed(input::mouse_pressed)
        .mouse_released(input::mouse_released)
        .mouse_wheel(input::mouse_wheel)
        .key_pressed(input::key_pressed)
        .raw_event(input::raw_window_event)
        .build()
        .unwrap();

    let window = app.window(window_id).unwrap();
    let egui = Egui::from_window(&window);
    let camera = Camera::new(params.world_width, params.world_height);

    Model {
        simulation,
        egui,
        debug_info: DebugInfo::default(),
        camera,
        mouse_position: Vec2::ZERO,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    model.egui.set_elapsed_time(update.since_start);
    let actions = ui::update_ui(&mut model.egui, &mut model.debug_info, model.simulation.params());

    if actions.spawn_batch > 0 {
        model.simulation.spawn_random(actions.spawn_batch);
    }

    if !model.debug_info.paused {
        let dt_ms = (update.since_last.as_secs_f32() * 1000.0).min(MAX_FRAME_MS);
        model.simulation.step(dt_ms);
    }

    model.debug_info.tick = model.simulation.tick();
    model.debug_info.stats = model.simulation.stats();
}
