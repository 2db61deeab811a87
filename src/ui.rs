/*
 * UI Module
 *
 * This module builds the egui control panel. Simulation parameters are fixed at
 * construction, so the panel only shows them; it owns the debug toggles and a
 * batch-spawn button.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::SimulationParams;

const SPAWN_BATCH: usize = 50;

/// What the user asked for this frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct UiActions {
    pub spawn_batch: usize,
}

pub fn update_ui(egui: &mut Egui, debug_info: &mut DebugInfo, params: &SimulationParams) -> UiActions {
    let mut actions = UiActions::default();
    let ctx = egui.begin_frame();

    egui::Window::new("Flock")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Statistics", |ui| {
                let stats = &debug_info.stats;
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Tick: {}", debug_info.tick));
                ui.label(format!("Boids: {} / {}", stats.agents, params.capacity));
                ui.label(format!("With neighbours: {}", stats.agents_with_neighbors));
                ui.label(format!("Mean neighbours: {:.2}", stats.mean_neighbors));
                ui.label(format!("Mean speed: {:.3}", stats.mean_speed));
            });

            ui.collapsing("Parameters", |ui| {
                ui.label(format!("Detection range: {:.0}", params.detection_range));
                ui.label(format!("Separation distance: {:.0}", params.desired_separation));
                ui.label(format!(
                    "Weights: {:.1} / {:.1} / {:.1}",
                    params.separation_weight, params.alignment_weight, params.cohesion_weight
                ));
                ui.label(format!("Blind spot: {:.0} degrees", params.blind_spot_half_angle_deg * 2.0));
                ui.label(format!("Neighbour search: {}", params.neighbor_search.label()));
            });

            ui.separator();

            if ui.button(format!("Spawn {SPAWN_BATCH}")).clicked() {
                actions.spawn_batch = SPAWN_BATCH;
            }
            ui.checkbox(&mut debug_info.show_debug, "Show field of view (D)");
            ui.checkbox(&mut debug_info.show_density, "Show density map (Space)");
            ui.checkbox(&mut debug_info.paused, "Pause (P)");
        });

    actions
}
