use crate::config::Config;
use crate::direction::Heading;
use crate::grid::OccupancyGrid;
use crate::pipe::{Pipe, StepOutcome};
use crate::scene::PIPE_COLORS;
use glam::IVec3;
use rand::Rng;

/// Fixed number of pipe slots; `max_active_pipes` can only restrict below this.
pub const MAX_PIPES: usize = 10;

/// The fixed-capacity pool of pipe slots updated every tick.
///
/// The tick pipeline is:
/// 1. Update every slot in fixed order. An entity's occupancy checks see
///    the effects of entities updated earlier in the same tick, so
///    same-tick contention for a cell resolves deterministically to the
///    lower slot (first mover wins).
/// 2. If the active count is below `cfg.max_active_pipes` and a Bernoulli
///    draw with probability `cfg.spawn_rate` succeeds, attempt exactly one
///    spawn.
///
/// Invariant: `active_count` always equals the number of slots with
/// `active == true` and never exceeds `cfg.max_active_pipes`.
#[derive(Debug)]
pub struct Fleet {
    pub pipes: Vec<Pipe>,
    active_count: usize,
}

impl Fleet {
    pub fn new() -> Self {
        Self {
            pipes: (0..MAX_PIPES).map(|_| Pipe::idle()).collect(),
            active_count: 0,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Advances the whole fleet by one tick.
    pub fn step(&mut self, grid: &mut OccupancyGrid, cfg: &Config, rng: &mut impl Rng) {
        let mut terminated = 0;
        for pipe in &mut self.pipes {
            if pipe.update(grid, cfg, rng) == StepOutcome::Terminated {
                terminated += 1;
            }
        }
        self.active_count -= terminated;

        if self.active_count < cfg.max_active_pipes && rng.random::<f32>() < cfg.spawn_rate {
            self.try_spawn(grid, rng);
        }
    }

    /// Attempts to activate one dormant slot.
    ///
    /// Each dormant slot in scan order draws a single random candidate cell
    /// in the central half of the grid; an occupied candidate skips to the
    /// next dormant slot rather than re-drawing. The first free candidate
    /// spawns a pipe with a random heading and color and ends the scan.
    ///
    /// Returns `true` if a pipe was activated.
    pub fn try_spawn(&mut self, grid: &mut OccupancyGrid, rng: &mut impl Rng) -> bool {
        for i in 0..self.pipes.len() {
            if self.pipes[i].active {
                continue;
            }

            let cell = random_start_cell(grid.dim(), rng);
            if !grid.is_free(cell) {
                continue;
            }

            let heading = Heading::random(rng);
            let color = rng.random_range(0..PIPE_COLORS.len());
            self.pipes[i].activate(cell, heading, color);
            grid.mark(cell);
            self.active_count += 1;
            return true;
        }
        false
    }
}

/// A random cell in `[dim/4, dim/4 + dim/2)` on each axis, keeping spawn
/// points away from the walls.
fn random_start_cell(dim: usize, rng: &mut impl Rng) -> IVec3 {
    let lo = (dim / 4) as i32;
    let span = (dim / 2).max(1) as i32;
    IVec3::new(
        lo + rng.random_range(0..span),
        lo + rng.random_range(0..span),
        lo + rng.random_range(0..span),
    )
}
