/*
 * Renderer Module
 *
 * This module draws the simulation: the optional density heat map, the world
 * boundary, every boid as a triangle along its heading, and in debug mode the
 * field of view of each boid with boids tinted by how many neighbours they see.
 */

use std::f32::consts::PI;

use nannou::prelude::*;

use crate::app::Model;
use crate::boid::Boid;
use crate::camera::Camera;

// Background, and the cold end of the density colour ramp
const LIGHT_BLUE: (f32, f32, f32) = (0.678, 0.847, 0.902);
// Points used to approximate the field-of-view arc
const CONE_SEGMENTS: usize = 24;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();
    let (r, g, b) = LIGHT_BLUE;
    draw.background().color(rgb(r, g, b));

    let simulation = &model.simulation;
    let params = simulation.params();

    if model.debug_info.show_density {
        draw_density(&draw, model, window_rect);
    }

    // World boundary
    let top_left = model.camera.world_to_screen(vec2(0.0, 0.0), window_rect);
    let bottom_right = model
        .camera
        .world_to_screen(vec2(params.world_width, params.world_height), window_rect);
    let world_rect = Rect::from_corners(top_left, bottom_right);
    draw.rect()
        .xy(world_rect.xy())
        .wh(world_rect.wh())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.2, 0.2, 0.2, 1.0));

    let half_angle = params.blind_spot_half_angle();
    for boid in simulation.agents() {
        if model.debug_info.show_debug {
            draw_field_of_view(&draw, &model.camera, window_rect, boid, params.detection_range, half_angle);
        }
        draw_boid(&draw, model, window_rect, boid, params.agent_extent);
    }

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}

fn draw_boid(draw: &Draw, model: &Model, window_rect: Rect, boid: &Boid, extent: f32) {
    let camera = &model.camera;
    let screen_pos = camera.world_to_screen(vec2(boid.position.x, boid.position.y), window_rect);
    let size = extent / 2.0 * camera.zoom;

    let color = if model.debug_info.show_debug && boid.has_neighbors() {
        let alpha = (boid.neighbor_count() as f32 / 10.0).min(1.0);
        rgba(1.0, 0.0, 0.0, alpha)
    } else {
        rgba(1.0, 1.0, 1.0, 1.0)
    };

    let points = [
        pt2(size, 0.0),
        pt2(-size, size / 2.0),
        pt2(-size, -size / 2.0),
    ];
    draw.polygon()
        .color(color)
        .points(points)
        .xy(screen_pos)
        .rotate(camera.screen_angle(boid.heading));
}

// The visible sector: everything but the rear wedge
fn draw_field_of_view(
    draw: &Draw,
    camera: &Camera,
    window_rect: Rect,
    boid: &Boid,
    range: f32,
    blind_half_angle: f32,
) {
    let center = vec2(boid.position.x, boid.position.y);
    let visible_half = PI - blind_half_angle;

    let mut points = Vec::with_capacity(CONE_SEGMENTS + 3);
    points.push(camera.world_to_screen(center, window_rect));
    for i in 0..=CONE_SEGMENTS {
        let t = i as f32 / CONE_SEGMENTS as f32;
        let angle = boid.heading - visible_half + 2.0 * visible_half * t;
        let edge = center + vec2(angle.cos(), angle.sin()) * range;
        points.push(camera.world_to_screen(edge, window_rect));
    }
    points.push(camera.world_to_screen(center, window_rect));

    draw.polyline()
        .weight(1.0)
        .points(points)
        .color(rgba(0.0, 0.5, 0.0, 0.5));
}

fn draw_density(draw: &Draw, model: &Model, window_rect: Rect) {
    let simulation = &model.simulation;
    let grid = simulation.grid();
    let cell = grid.cell_size;
    let density = simulation.density_map();
    let (r, g, b) = LIGHT_BLUE;

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let value = density[row * grid.cols() + col].clamp(0.0, 1.0);
            if value <= 0.0 {
                continue;
            }

            let center = vec2((col as f32 + 0.5) * cell, (row as f32 + 0.5) * cell);
            let screen = model.camera.world_to_screen(center, window_rect);
            let side = cell * model.camera.zoom;
            draw.rect()
                .xy(screen)
                .w_h(side, side)
                .color(rgb(r + (1.0 - r) * value, g * (1.0 - value), b * (1.0 - value)));
        }
    }
}
