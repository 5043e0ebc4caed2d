/// Visual growth saturates just short of one full segment until the next
/// logical move commits and resets it.
pub const PROGRESS_CAP: f32 = 1.0 - f32::EPSILON;

/// Per-pipe timing state decoupling two cadences.
///
/// The *logical* cadence commits one segment every `delay` ticks; the
/// *visual* cadence advances [`GrowthClock::progress`] a little every tick
/// in between, so a renderer can draw the forming segment smoothly
/// extending while the walk itself stays put.
///
/// `progress` lives in `[0, 1)`: it is reset to exactly `0.0` on the tick
/// a segment commits and accumulates `growth_speed` per tick otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrowthClock {
    pub counter: u32,
    pub progress: f32,
}

impl GrowthClock {
    /// Zeroes both the tick counter and the visual progress.
    pub fn reset(&mut self) {
        self.counter = 0;
        self.progress = 0.0;
    }

    /// Advances the clock by one tick.
    ///
    /// Returns `true` when the logical-move cadence fires on this tick; the
    /// clock has then already rearmed itself (counter and progress zeroed).
    /// Otherwise only the visual progress advances and `false` is returned.
    pub fn tick(&mut self, delay: u32, growth_speed: f32) -> bool {
        self.counter += 1;
        if self.counter < delay {
            self.progress = (self.progress + growth_speed).min(PROGRESS_CAP);
            false
        } else {
            self.reset();
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_the_delay_tick_and_rearms() {
        let mut clock = GrowthClock::default();

        assert!(!clock.tick(3, 0.1));
        assert!(!clock.tick(3, 0.1));
        assert!(clock.tick(3, 0.1));

        assert_eq!(clock.counter, 0);
        assert_eq!(clock.progress, 0.0);
    }

    #[test]
    fn progress_accumulates_between_moves() {
        let mut clock = GrowthClock::default();

        clock.tick(5, 0.05);
        assert!((clock.progress - 0.05).abs() < 1e-6);
        clock.tick(5, 0.05);
        assert!((clock.progress - 0.10).abs() < 1e-6);
        clock.tick(5, 0.05);
        assert!((clock.progress - 0.15).abs() < 1e-6);
    }

    #[test]
    fn delay_of_one_moves_every_tick() {
        let mut clock = GrowthClock::default();
        for _ in 0..10 {
            assert!(clock.tick(1, 0.05));
            assert_eq!(clock.progress, 0.0);
        }
    }

    #[test]
    fn progress_saturates_below_one_segment() {
        let mut clock = GrowthClock::default();
        for _ in 0..100 {
            clock.tick(1000, 0.3);
        }
        assert!(clock.progress < 1.0);
        assert_eq!(clock.progress, PROGRESS_CAP);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut clock = GrowthClock::default();
        clock.tick(10, 0.2);
        clock.tick(10, 0.2);
        assert!(clock.counter > 0 && clock.progress > 0.0);

        clock.reset();
        assert_eq!(clock.counter, 0);
        assert_eq!(clock.progress, 0.0);
    }
}
