/*
 * Camera Module
 *
 * This module defines the Camera struct that maps the simulation world onto the
 * window. World space has its origin in the top-left corner with y growing
 * downwards; nannou's screen space is centred with y growing upwards.
 * The camera also supports zooming and panning.
 */

use nannou::prelude::*;

pub struct Camera {
    // World point shown at the window centre
    pub position: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
}

impl Camera {
    /// A camera centred on a world of the given size at 1:1 zoom.
    pub fn new(world_width: f32, world_height: f32) -> Self {
        Self {
            position: vec2(world_width / 2.0, world_height / 2.0),
            zoom: 1.0,
            min_zoom: 0.25,
            max_zoom: 5.0,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
        }
    }

    // Convert a point from world space to screen space
    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        let offset = (point - self.position) * self.zoom;
        vec2(offset.x, -offset.y) + window_rect.xy()
    }

    // Convert a point from screen space to world space
    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        let centered = point - window_rect.xy();
        vec2(centered.x, -centered.y) / self.zoom + self.position
    }

    /// Screen rotation for a world-space heading (the y axis is flipped).
    pub fn screen_angle(&self, heading: f32) -> f32 {
        -heading
    }

    // Zoom around the cursor so the world point under it stays put
    pub fn zoom(&mut self, scroll_delta: Vec2, cursor_position: Vec2, window_rect: Rect) {
        let zoom_factor = 1.0 + scroll_delta.y * 0.1;

        let cursor_world_before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * zoom_factor).clamp(self.min_zoom, self.max_zoom);
        let cursor_world_after = self.screen_to_world(cursor_position, window_rect);

        self.position += cursor_world_before - cursor_world_after;
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
    }

    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.position -= vec2(delta.x, -delta.y) / self.zoom;
                self.last_cursor_pos = position;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }
}
