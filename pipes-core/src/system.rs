//! The owned simulation context and its external interface.
//!
//! [`Simulation`] is an explicit, self-contained context (grid, fleet,
//! camera, configuration, seeded RNG); independent instances never share
//! state, which keeps runs reproducible and test-isolated.
//!
//! [`PipeSystem`] wraps an optional `Simulation` to provide the
//! init/step/teardown surface expected by an embedding animation loop:
//! every operation on an uninitialized or torn-down system is a silent
//! no-op, `step` then yields an empty scene, and `teardown` is idempotent.

use crate::camera::{CameraPose, OrbitCamera};
use crate::config::Config;
use crate::direction::FallbackPolicy;
use crate::fleet::{Fleet, MAX_PIPES};
use crate::grid::OccupancyGrid;
use crate::scene::{CELL_SIZE, Scene, ScenePipe, cell_to_world};
use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Cells per axis when the embedder does not choose a dimension.
pub const DEFAULT_GRID_DIMENSION: usize = 20;

/// One independent pipe-growth simulation.
#[derive(Debug)]
pub struct Simulation {
    pub(crate) grid: OccupancyGrid,
    pub(crate) fleet: Fleet,
    pub(crate) camera: OrbitCamera,
    pub(crate) cfg: Config,
    pub(crate) rng: StdRng,
    tick: u64,
}

impl Simulation {
    /// Creates a simulation over a `dim³` grid.
    ///
    /// The configuration is clamped into range; the RNG is seeded
    /// explicitly so identical `(dim, cfg, seed)` triples replay the same
    /// run.
    pub fn new(dim: usize, cfg: Config, seed: u64) -> Self {
        Self {
            grid: OccupancyGrid::new(dim),
            fleet: Fleet::new(),
            camera: OrbitCamera::new(),
            cfg: cfg.clamped(),
            rng: StdRng::seed_from_u64(seed),
            tick: 0,
        }
    }

    /// Advances the simulation by one tick: fleet update and spawn attempt,
    /// then the camera's idle rotation.
    pub fn step(&mut self) {
        self.fleet
            .step(&mut self.grid, &self.cfg, &mut self.rng);
        self.camera.idle_step(self.cfg.camera_rotation_speed);
        self.tick += 1;
    }

    /// Builds the renderable description of the current tick.
    ///
    /// Only active pipes appear. Each contributes its committed joints in
    /// world space plus, once at least one segment is committed and some
    /// visual progress has accrued, the partially grown tip segment running
    /// from the last joint toward the current position.
    pub fn scene(&self) -> Scene {
        let dim = self.grid.dim();
        let pipes = self
            .fleet
            .pipes
            .iter()
            .filter(|p| p.active)
            .map(|p| {
                let joints: Vec<Vec3> =
                    p.joints.iter().map(|&c| cell_to_world(c, dim)).collect();
                let growing = joints.last().and_then(|&last| {
                    (p.clock.progress > 0.0).then(|| {
                        let tip = cell_to_world(p.pos, dim);
                        [last, last + (tip - last) * p.clock.progress]
                    })
                });
                ScenePipe {
                    color: p.color,
                    joints,
                    growing,
                }
            })
            .collect();

        Scene {
            pipes,
            camera: self.camera.pose(),
            half_extent: dim as f32 * CELL_SIZE / 2.0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn active_pipes(&self) -> usize {
        self.fleet.active_count()
    }

    pub fn occupied_cells(&self) -> usize {
        self.grid.occupied_count()
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }
}

/// The external interface around an optional [`Simulation`].
#[derive(Debug, Default)]
pub struct PipeSystem {
    sim: Option<Simulation>,
}

impl PipeSystem {
    /// An uninitialized system; every operation no-ops until [`PipeSystem::init`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates grid and fleet storage and starts a fresh run, replacing
    /// any live simulation wholesale.
    pub fn init(&mut self, dim: usize, cfg: Config, seed: u64) {
        self.sim = Some(Simulation::new(dim, cfg, seed));
    }

    /// Releases all owned storage. Idempotent; safe on an uninitialized
    /// system.
    pub fn teardown(&mut self) {
        self.sim = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.sim.is_some()
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.sim.as_ref()
    }

    /// Advances one tick and returns the renderable scene; an empty scene
    /// before `init` or after `teardown`.
    pub fn step(&mut self) -> Scene {
        match &mut self.sim {
            Some(sim) => {
                sim.step();
                sim.scene()
            }
            None => Scene::default(),
        }
    }

    pub fn set_fade_speed(&mut self, speed: f32) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.fade_speed = speed.max(0.0);
        }
    }

    pub fn set_spawn_rate(&mut self, rate: f32) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.spawn_rate = rate.clamp(0.0, 1.0);
        }
    }

    pub fn set_turn_probability(&mut self, probability: f32) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.turn_probability = probability.clamp(0.0, 1.0);
        }
    }

    pub fn set_max_active_pipes(&mut self, max: usize) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.max_active_pipes = max.min(MAX_PIPES);
        }
    }

    pub fn set_segment_update_delay(&mut self, delay: u32) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.segment_update_delay = delay.max(1);
        }
    }

    pub fn set_growth_speed(&mut self, speed: f32) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.growth_speed = speed.max(0.0);
        }
    }

    pub fn set_fallback_policy(&mut self, policy: FallbackPolicy) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.fallback_policy = policy;
        }
    }

    pub fn set_camera_speed(&mut self, speed: f32) {
        if let Some(sim) = &mut self.sim {
            sim.cfg.camera_rotation_speed = speed;
        }
    }

    /// Pointer input feeds the orbit camera only; the walk never sees it.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if let Some(sim) = &mut self.sim {
            sim.camera.pointer_down(Vec2::new(x, y));
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(sim) = &mut self.sim {
            sim.camera.pointer_move(Vec2::new(x, y));
        }
    }

    pub fn pointer_up(&mut self) {
        if let Some(sim) = &mut self.sim {
            sim.camera.pointer_up();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Heading;
    use crate::pipe::MAX_PIPE_LENGTH;
    use glam::IVec3;
    use std::collections::HashSet;

    #[test]
    fn step_before_init_yields_an_empty_scene() {
        let mut system = PipeSystem::new();
        let scene = system.step();
        assert!(scene.pipes.is_empty());
        assert!(!system.is_initialized());
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut system = PipeSystem::new();
        system.init(DEFAULT_GRID_DIMENSION, Config::default(), 1);
        assert!(system.is_initialized());

        system.teardown();
        system.teardown();
        assert!(!system.is_initialized());

        let scene = system.step();
        assert!(scene.pipes.is_empty());

        // Teardown on a never-initialized system is equally fine.
        let mut fresh = PipeSystem::new();
        fresh.teardown();
        assert!(!fresh.is_initialized());
    }

    #[test]
    fn setters_and_pointers_before_init_are_noops() {
        let mut system = PipeSystem::new();
        system.set_spawn_rate(0.5);
        system.set_max_active_pipes(3);
        system.pointer_down(10.0, 10.0);
        system.pointer_move(20.0, 20.0);
        system.pointer_up();
        assert!(!system.is_initialized());
    }

    #[test]
    fn setters_clamp_out_of_range_values() {
        let mut system = PipeSystem::new();
        system.init(DEFAULT_GRID_DIMENSION, Config::default(), 1);

        system.set_spawn_rate(3.0);
        system.set_turn_probability(-0.5);
        system.set_max_active_pipes(MAX_PIPES + 7);
        system.set_segment_update_delay(0);
        system.set_growth_speed(-2.0);
        system.set_fade_speed(-1.0);

        let cfg = system.simulation().unwrap().config();
        assert_eq!(cfg.spawn_rate, 1.0);
        assert_eq!(cfg.turn_probability, 0.0);
        assert_eq!(cfg.max_active_pipes, MAX_PIPES);
        assert_eq!(cfg.segment_update_delay, 1);
        assert_eq!(cfg.growth_speed, 0.0);
        assert_eq!(cfg.fade_speed, 0.0);
    }

    #[test]
    fn init_clamps_the_starting_config() {
        let mut system = PipeSystem::new();
        let cfg = Config {
            spawn_rate: 99.0,
            max_active_pipes: 99,
            segment_update_delay: 0,
            ..Config::default()
        };
        system.init(DEFAULT_GRID_DIMENSION, cfg, 1);

        let cfg = system.simulation().unwrap().config();
        assert_eq!(cfg.spawn_rate, 1.0);
        assert_eq!(cfg.max_active_pipes, MAX_PIPES);
        assert_eq!(cfg.segment_update_delay, 1);
    }

    #[test]
    fn reinit_replaces_the_run() {
        let mut system = PipeSystem::new();
        let cfg = Config {
            spawn_rate: 1.0,
            ..Config::default()
        };
        system.init(DEFAULT_GRID_DIMENSION, cfg, 7);
        for _ in 0..50 {
            system.step();
        }
        assert!(system.simulation().unwrap().tick() == 50);
        assert!(system.simulation().unwrap().occupied_cells() > 0);

        system.init(DEFAULT_GRID_DIMENSION, cfg, 8);
        let sim = system.simulation().unwrap();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.active_pipes(), 0);
        assert_eq!(sim.occupied_cells(), 0);
    }

    #[test]
    fn identical_seeds_replay_identical_runs() {
        let cfg = Config {
            spawn_rate: 0.8,
            turn_probability: 0.6,
            segment_update_delay: 2,
            ..Config::default()
        };
        let mut a = Simulation::new(DEFAULT_GRID_DIMENSION, cfg, 424_242);
        let mut b = Simulation::new(DEFAULT_GRID_DIMENSION, cfg, 424_242);

        for _ in 0..300 {
            a.step();
            b.step();
        }
        assert_eq!(a.scene(), b.scene());
        assert_eq!(a.occupied_cells(), b.occupied_cells());
        assert_eq!(a.active_pipes(), b.active_pipes());
    }

    #[test]
    fn different_seeds_diverge() {
        let cfg = Config {
            spawn_rate: 1.0,
            ..Config::default()
        };
        let mut a = Simulation::new(DEFAULT_GRID_DIMENSION, cfg, 1);
        let mut b = Simulation::new(DEFAULT_GRID_DIMENSION, cfg, 2);
        for _ in 0..100 {
            a.step();
            b.step();
        }
        assert_ne!(a.scene().pipes, b.scene().pipes);
    }

    #[test]
    fn active_count_stays_within_both_caps() {
        let cfg = Config {
            spawn_rate: 1.0,
            max_active_pipes: MAX_PIPES,
            segment_update_delay: 1,
            ..Config::default()
        };
        let mut sim = Simulation::new(DEFAULT_GRID_DIMENSION, cfg, 3);
        for _ in 0..500 {
            sim.step();
            assert!(sim.active_pipes() <= cfg.max_active_pipes);
            assert!(sim.active_pipes() <= MAX_PIPES);
            assert_eq!(sim.scene().pipes.len(), sim.active_pipes());
        }
    }

    /// No two pipes ever pass through the same cell: occupancy is claimed
    /// before a move commits and never released, so every active path's
    /// cells are globally unique for the whole session.
    #[test]
    fn paths_never_overlap() {
        let cfg = Config {
            spawn_rate: 1.0,
            turn_probability: 0.5,
            segment_update_delay: 2,
            max_active_pipes: MAX_PIPES,
            ..Config::default()
        };
        let mut sim = Simulation::new(DEFAULT_GRID_DIMENSION, cfg, 99);

        for _ in 0..1_000 {
            sim.step();

            let mut seen: HashSet<IVec3> = HashSet::new();
            for pipe in sim.fleet.pipes.iter().filter(|p| p.active) {
                for &cell in pipe.joints.iter().chain(std::iter::once(&pipe.pos)) {
                    assert!(seen.insert(cell), "two active pipes share {cell:?}");
                    assert!(!sim.grid.is_free(cell));
                }
                assert!(pipe.joints.len() <= MAX_PIPE_LENGTH);
            }
        }
    }

    #[test]
    fn scene_reports_the_partial_tip_segment() {
        let cfg = Config {
            spawn_rate: 0.0,
            turn_probability: 0.0,
            segment_update_delay: 3,
            growth_speed: 0.05,
            ..Config::default()
        };
        let mut sim = Simulation::new(5, cfg, 0);
        sim.fleet.pipes[0].activate(IVec3::new(2, 2, 2), Heading::PosX, 2);
        sim.grid.mark(IVec3::new(2, 2, 2));

        // Before the first commit there is nothing to interpolate from.
        sim.step();
        let scene = sim.scene();
        assert_eq!(scene.pipes.len(), 1);
        assert!(scene.pipes[0].joints.is_empty());
        assert_eq!(scene.pipes[0].growing, None);

        // Ticks 2 and 3: the third tick commits the move to (3, 2, 2).
        sim.step();
        sim.step();
        let scene = sim.scene();
        assert_eq!(scene.pipes[0].joints, vec![Vec3::ZERO]);
        // Progress was just reset, so no partial segment this tick.
        assert_eq!(scene.pipes[0].growing, None);

        // One growth tick later the tip extends toward the new position.
        sim.step();
        let scene = sim.scene();
        let [from, to] = scene.pipes[0].growing.expect("tip should be growing");
        assert_eq!(from, Vec3::ZERO);
        let expected = Vec3::new(CELL_SIZE * 0.05, 0.0, 0.0);
        assert!((to - expected).length() < 1e-5);
    }

    #[test]
    fn camera_pose_tracks_pointer_drags_between_ticks() {
        let mut system = PipeSystem::new();
        system.init(DEFAULT_GRID_DIMENSION, Config::default(), 0);
        let before = system.simulation().unwrap().camera_pose();

        system.pointer_down(100.0, 100.0);
        system.pointer_move(160.0, 80.0);
        system.pointer_up();

        let after = system.simulation().unwrap().camera_pose();
        assert_ne!(before, after);
    }
}
