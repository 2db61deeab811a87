/*
 * Input Module
 *
 * This module handles user input events for the viewer.
 *
 * - Left click spawns a boid under the cursor (ignored once the flock is full)
 * - Right drag pans, the mouse wheel zooms
 * - D toggles debug colouring, Space the density heat map, P pauses
 */

use glam::Vec2 as WorldVec2;
use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};
use tracing::debug;

use crate::app::Model;

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    let new_pos = Vec2::new(pos.x, pos.y);

    if model.camera.is_dragging {
        model.camera.drag(new_pos);
    }

    model.mouse_position = new_pos;
}

// Mouse pressed event handler
pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if model.egui.ctx().is_pointer_over_area() {
        return;
    }

    match button {
        MouseButton::Left => {
            let world_pos = model.camera.screen_to_world(model.mouse_position, app.window_rect());
            match model.simulation.spawn(WorldVec2::new(world_pos.x, world_pos.y)) {
                Some(index) => debug!(index, x = world_pos.x, y = world_pos.y, "boid spawned"),
                None => debug!("flock is full"),
            }
        }
        MouseButton::Right => model.camera.start_drag(model.mouse_position),
        _ => {}
    }
}

// Mouse released event handler
pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Right {
        model.camera.end_drag();
    }
}

// Mouse wheel event handler for zooming
pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    let window_rect = app.window_rect();
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            model.camera.zoom(vec2(x, y), model.mouse_position, window_rect);
        }
        MouseScrollDelta::PixelDelta(pos) => {
            model.camera.zoom(
                vec2(pos.x as f32, pos.y as f32) * 0.01,
                model.mouse_position,
                window_rect,
            );
        }
    }
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    let toggles = &mut model.debug_info;
    match key {
        Key::D => toggles.show_debug = !toggles.show_debug,
        Key::Space => toggles.show_density = !toggles.show_density,
        Key::P => toggles.paused = !toggles.paused,
        _ => {}
    }
}

// Pass raw window events through to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
