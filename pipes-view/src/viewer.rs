//! Interactive 3-D pipes viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`PipeSystem`] and
//! implements [`eframe::App`] to render the simulation's scene through the
//! orbit camera pose and to drive every tunable parameter through the
//! system's setter surface.

use eframe::App;
use glam::{Mat4, Vec3};
use pipes_core::{
    config::Config,
    direction::FallbackPolicy,
    fleet::MAX_PIPES,
    scene::{PIPE_COLORS, PIPE_RADIUS, Scene},
    system::{DEFAULT_GRID_DIMENSION, PipeSystem},
};
use rand::Rng;

/// Vertical field of view of the projection, 45°.
const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input (drags are forwarded to the system's
///    pointer interface and reach only the camera).
/// 2. If `running` and enough time has passed, advance the simulation one
///    tick and keep the returned [`Scene`].
/// 3. Project the scene through the camera pose and paint it.
///
/// The config side panel edits a local [`Config`] copy which is pushed
/// through the [`PipeSystem`] setters every frame, so clamping stays in
/// one place and values take effect on the next tick.
pub struct Viewer {
    system: PipeSystem,
    cfg: Config,
    seed: u64,

    running: bool,
    step_interval: f64,
    last_step_time: f64,

    scene: Scene,
}

impl Viewer {
    /// Creates a viewer over a freshly initialized simulation with a
    /// random seed and default configuration, already running.
    pub fn new() -> Self {
        let seed = rand::rng().random();
        let cfg = Config::default();
        let mut system = PipeSystem::new();
        system.init(DEFAULT_GRID_DIMENSION, cfg, seed);

        Self {
            system,
            cfg,
            seed,
            running: true,
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            scene: Scene::default(),
        }
    }

    /// Starts a fresh run with a new random seed, keeping the current
    /// configuration and camera defaults.
    fn reset(&mut self) {
        self.seed = rand::rng().random();
        self.system.init(DEFAULT_GRID_DIMENSION, self.cfg, self.seed);
        self.scene = Scene::default();
    }

    /// Pushes the panel's editing copy through the setter surface; the
    /// system clamps each value into range.
    fn apply_config(&mut self) {
        self.system.set_fade_speed(self.cfg.fade_speed);
        self.system.set_spawn_rate(self.cfg.spawn_rate);
        self.system.set_turn_probability(self.cfg.turn_probability);
        self.system.set_max_active_pipes(self.cfg.max_active_pipes);
        self.system
            .set_segment_update_delay(self.cfg.segment_update_delay);
        self.system.set_growth_speed(self.cfg.growth_speed);
        self.system.set_fallback_policy(self.cfg.fallback_policy);
        self.system.set_camera_speed(self.cfg.camera_rotation_speed);
    }

    /// Advances the simulation by a single tick and keeps its scene.
    fn step_once(&mut self) {
        self.scene = self.system.step();
    }

    /// Combined view-projection matrix for the current camera pose.
    ///
    /// The pose is queried live rather than taken from the last scene so
    /// drags stay responsive while the simulation is paused.
    fn view_projection(&self, rect: egui::Rect) -> Mat4 {
        let pose = self
            .system
            .simulation()
            .map(|s| s.camera_pose())
            .unwrap_or_default();
        let aspect = rect.width() / rect.height().max(1.0);
        Mat4::perspective_rh(FOV_Y, aspect, 0.1, 500.0)
            * Mat4::look_at_rh(pose.position, pose.target, pose.up)
    }

    /// Projects a world-space point into the canvas.
    ///
    /// Returns the screen position and the view depth, or `None` for
    /// points at or behind the camera plane.
    fn project(vp: Mat4, rect: egui::Rect, p: Vec3) -> Option<(egui::Pos2, f32)> {
        let clip = vp * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let center = rect.center();
        Some((
            egui::pos2(
                center.x + ndc.x * 0.5 * rect.width(),
                center.y - ndc.y * 0.5 * rect.height(),
            ),
            clip.w,
        ))
    }

    /// Screen pixels covered by one world unit at the given view depth.
    fn px_per_unit(rect: egui::Rect, depth: f32) -> f32 {
        rect.height() / (2.0 * depth * (FOV_Y * 0.5).tan())
    }

    /// Draws one world-space segment as a depth-scaled stroke.
    fn draw_segment(
        painter: &egui::Painter,
        vp: Mat4,
        rect: egui::Rect,
        a: Vec3,
        b: Vec3,
        color: egui::Color32,
    ) {
        let (Some((pa, da)), Some((pb, db))) =
            (Self::project(vp, rect, a), Self::project(vp, rect, b))
        else {
            return;
        };
        let width = PIPE_RADIUS * 2.0 * Self::px_per_unit(rect, (da + db) * 0.5);
        painter.line_segment([pa, pb], egui::Stroke::new(width.max(1.0), color));
    }

    /// Draws the wireframe of the grid bounds.
    fn draw_bounds(painter: &egui::Painter, vp: Mat4, rect: egui::Rect, half: f32) {
        let stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(50, 50, 50));
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z) * half;
        for s in [-1.0f32, 1.0] {
            for t in [-1.0f32, 1.0] {
                let runs = [
                    [corner(-1.0, s, t), corner(1.0, s, t)],
                    [corner(s, -1.0, t), corner(s, 1.0, t)],
                    [corner(s, t, -1.0), corner(s, t, 1.0)],
                ];
                for [a, b] in runs {
                    let (Some((pa, _)), Some((pb, _))) =
                        (Self::project(vp, rect, a), Self::project(vp, rect, b))
                    else {
                        continue;
                    };
                    painter.line_segment([pa, pb], stroke);
                }
            }
        }
    }

    /// Committed-segment color for a joint of the given age, dimmed by the
    /// fade speed so old runs recede into the background.
    fn faded_color(&self, base: [u8; 3], age: usize) -> egui::Color32 {
        let alpha = (255.0 - self.cfg.fade_speed * age as f32 * 6.0).clamp(70.0, 255.0) as u8;
        egui::Color32::from_rgba_unmultiplied(base[0], base[1], base[2], alpha)
    }

    /// Builds the top panel UI (run controls, stepping, reset).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.001..=1.0)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    self.step_once();
                    self.last_step_time = ctx.input(|i| i.time);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.label(format!("seed = {}", self.seed));
            });
        });
    }

    /// Builds the bottom status bar (tick, active pipes, occupancy).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(sim) = self.system.simulation() {
                    ui.label(format!("tick = {}", sim.tick()));
                    ui.separator();
                    ui.label(format!("active pipes = {}", sim.active_pipes()));
                    ui.label(format!("occupied cells = {}", sim.occupied_cells()));
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for simulation parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Fleet");
                Self::labeled_drag_usize(
                    ui,
                    "max_active_pipes:",
                    &mut self.cfg.max_active_pipes,
                    0..=MAX_PIPES,
                    1.0,
                );
                Self::labeled_drag_f32(ui, "spawn_rate:", &mut self.cfg.spawn_rate, 0.0..=1.0, 0.01);

                ui.separator();
                ui.label("Walk");
                Self::labeled_drag_f32(
                    ui,
                    "turn_probability:",
                    &mut self.cfg.turn_probability,
                    0.0..=1.0,
                    0.01,
                );
                ui.horizontal(|ui| {
                    ui.label("fallback:");
                    egui::ComboBox::from_id_salt("fallback_policy")
                        .selected_text(match self.cfg.fallback_policy {
                            FallbackPolicy::ContinueStraight => "continue straight",
                            FallbackPolicy::AllowReversal => "allow reversal",
                        })
                        .show_ui(ui, |ui| {
                            ui.selectable_value(
                                &mut self.cfg.fallback_policy,
                                FallbackPolicy::ContinueStraight,
                                "continue straight",
                            );
                            ui.selectable_value(
                                &mut self.cfg.fallback_policy,
                                FallbackPolicy::AllowReversal,
                                "allow reversal",
                            );
                        });
                });

                ui.separator();
                ui.label("Cadence");
                ui.horizontal(|ui| {
                    ui.label("segment_update_delay:");
                    ui.add(
                        egui::DragValue::new(&mut self.cfg.segment_update_delay)
                            .range(1..=120)
                            .speed(1.0),
                    );
                });
                Self::labeled_drag_f32(
                    ui,
                    "growth_speed:",
                    &mut self.cfg.growth_speed,
                    0.0..=1.0,
                    0.005,
                );

                ui.separator();
                ui.label("Display");
                Self::labeled_drag_f32(ui, "fade_speed:", &mut self.cfg.fade_speed, 0.0..=10.0, 0.1);
                Self::labeled_drag_f32(
                    ui,
                    "camera_speed:",
                    &mut self.cfg.camera_rotation_speed,
                    -0.05..=0.05,
                    0.0005,
                );

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
            });

        // Hand the (possibly edited) values to the simulation.
        self.apply_config();
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the central canvas: input handling, projection, painting.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Drags orbit the camera through the system's pointer interface.
            if let Some(pos) = response.interact_pointer_pos() {
                if response.drag_started() {
                    self.system.pointer_down(pos.x, pos.y);
                } else if response.dragged() {
                    self.system.pointer_move(pos.x, pos.y);
                }
            }
            if response.drag_stopped() {
                self.system.pointer_up();
            }

            let vp = self.view_projection(rect);

            if self.scene.half_extent > 0.0 {
                Self::draw_bounds(&painter, vp, rect, self.scene.half_extent);
            }

            for pipe in &self.scene.pipes {
                let base = PIPE_COLORS[pipe.color % PIPE_COLORS.len()];
                let joint_count = pipe.joints.len();

                // Committed runs, oldest joints dimmed the most.
                for (i, pair) in pipe.joints.windows(2).enumerate() {
                    let color = self.faded_color(base, joint_count - 1 - i);
                    Self::draw_segment(&painter, vp, rect, pair[0], pair[1], color);
                }

                // Joint discs cover the stroke corners.
                for (i, &joint) in pipe.joints.iter().enumerate() {
                    if let Some((pos, depth)) = Self::project(vp, rect, joint) {
                        let r = PIPE_RADIUS * 1.1 * Self::px_per_unit(rect, depth);
                        painter.circle_filled(pos, r.max(1.0), self.faded_color(base, joint_count - 1 - i));
                    }
                }

                // The forming tip segment at full intensity.
                if let Some([from, to]) = pipe.growing {
                    let color = egui::Color32::from_rgb(base[0], base[1], base[2]);
                    Self::draw_segment(&painter, vp, rect, from, to, color);
                }
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                if now - self.last_step_time >= self.step_interval {
                    self.step_once();
                    self.last_step_time = now;
                }
                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
