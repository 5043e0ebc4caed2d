use crate::config::Config;
use crate::direction::{Heading, choose_heading};
use crate::grid::OccupancyGrid;
use crate::scheduler::GrowthClock;
use crate::types::ColorIndex;
use glam::IVec3;
use rand::Rng;

/// Hard cap on committed joints per pipe.
pub const MAX_PIPE_LENGTH: usize = 30;

/// A pipe retires this many segments before the hard cap.
pub const LENGTH_MARGIN: usize = 5;

/// Outcome of one [`Pipe::update`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The slot is inactive; nothing happened.
    Idle,
    /// Sub-delay tick: only visual growth advanced.
    Growing,
    /// A segment was committed and the pipe moved one cell.
    Advanced,
    /// The pipe retired this tick (bounds exit, blocked cell, or max length).
    /// Its slot is immediately reusable; occupancy marks stay.
    Terminated,
}

/// One growing pipe occupying a fleet slot.
///
/// Slots are reused: an inactive `Pipe` is dormant state waiting for
/// [`Pipe::activate`], not a destroyed object.
#[derive(Debug)]
pub struct Pipe {
    pub pos: IVec3,
    pub heading: Heading,
    pub color: ColorIndex,
    pub active: bool,
    /// Committed moves so far; drives the retirement threshold.
    pub length: usize,
    /// Committed segment endpoints, oldest first, bounded by [`MAX_PIPE_LENGTH`].
    pub joints: Vec<IVec3>,
    pub clock: GrowthClock,
}

impl Pipe {
    /// A dormant slot.
    pub fn idle() -> Self {
        Self {
            pos: IVec3::ZERO,
            heading: Heading::PosX,
            color: 0,
            active: false,
            length: 0,
            joints: Vec::with_capacity(MAX_PIPE_LENGTH),
            clock: GrowthClock::default(),
        }
    }

    /// Brings a dormant slot to life at `pos`.
    ///
    /// Counters, joints, and growth state are zeroed. The caller marks the
    /// starting cell on the grid.
    pub fn activate(&mut self, pos: IVec3, heading: Heading, color: ColorIndex) {
        self.pos = pos;
        self.heading = heading;
        self.color = color;
        self.active = true;
        self.length = 0;
        self.joints.clear();
        self.clock.reset();
    }

    fn retire(&mut self) -> StepOutcome {
        self.active = false;
        StepOutcome::Terminated
    }

    /// Advances this pipe by one tick.
    ///
    /// Until the per-segment delay elapses only visual growth accumulates.
    /// On the movement tick the current position is committed as a joint
    /// and the pipe steps one cell along its heading. A destination outside
    /// the grid or already occupied retires the pipe instead, so every
    /// committed move lands on a cell observed free within the same tick.
    /// After a move the heading is re-selected with probability
    /// `turn_probability`, and the pipe retires once its length passes
    /// `MAX_PIPE_LENGTH - LENGTH_MARGIN`.
    pub fn update(
        &mut self,
        grid: &mut OccupancyGrid,
        cfg: &Config,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        if !self.active {
            return StepOutcome::Idle;
        }

        if !self.clock.tick(cfg.segment_update_delay, cfg.growth_speed) {
            return StepOutcome::Growing;
        }

        if self.joints.len() < MAX_PIPE_LENGTH {
            self.joints.push(self.pos);
        }

        // A destination off the grid or already occupied ends this pipe.
        let next = self.pos + self.heading.delta();
        if !grid.is_free(next) {
            return self.retire();
        }

        grid.mark(next);
        self.pos = next;
        self.length += 1;

        if rng.random::<f32>() < cfg.turn_probability
            && let Some(h) = choose_heading(grid, self.pos, self.heading, cfg.fallback_policy, rng)
        {
            self.heading = h;
        }

        if self.length > MAX_PIPE_LENGTH - LENGTH_MARGIN {
            return self.retire();
        }

        StepOutcome::Advanced
    }
}
