use crate::direction::FallbackPolicy;
use crate::fleet::MAX_PIPES;

/// Tunable simulation parameters.
///
/// All values take effect on the next tick. Construction sites and setters
/// clamp out-of-range values via [`Config::clamped`] instead of letting
/// them corrupt fleet or cadence invariants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Rendering decay rate for aged segments; carried for the view layer,
    /// never read by the walk itself.
    pub fade_speed: f32,
    /// Per-tick probability of attempting one spawn, in `[0, 1]`.
    pub spawn_rate: f32,
    /// Per-movement-tick probability of re-selecting the heading, in `[0, 1]`.
    pub turn_probability: f32,
    /// Concurrency cap on active pipes, in `[0, MAX_PIPES]`.
    pub max_active_pipes: usize,
    /// Ticks per logical move, at least 1.
    pub segment_update_delay: u32,
    /// Visual growth added per tick between moves.
    pub growth_speed: f32,
    /// What the heading selection does when no candidate survives.
    pub fallback_policy: FallbackPolicy,
    /// Idle orbit advance per tick, in radians.
    pub camera_rotation_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fade_speed: 1.0,
            spawn_rate: 0.15,
            turn_probability: 0.25,
            max_active_pipes: 4,
            segment_update_delay: 10,
            growth_speed: 0.05,
            fallback_policy: FallbackPolicy::ContinueStraight,
            camera_rotation_speed: 0.002,
        }
    }
}

impl Config {
    /// Returns a copy with every field forced into its valid range.
    pub fn clamped(mut self) -> Self {
        self.fade_speed = self.fade_speed.max(0.0);
        self.spawn_rate = self.spawn_rate.clamp(0.0, 1.0);
        self.turn_probability = self.turn_probability.clamp(0.0, 1.0);
        self.max_active_pipes = self.max_active_pipes.min(MAX_PIPES);
        self.segment_update_delay = self.segment_update_delay.max(1);
        self.growth_speed = self.growth_speed.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_in_range() {
        let cfg = Config::default();
        assert_eq!(cfg.clamped(), cfg);
    }

    #[test]
    fn clamped_forces_fields_into_range() {
        let cfg = Config {
            fade_speed: -3.0,
            spawn_rate: 7.5,
            turn_probability: -0.1,
            max_active_pipes: MAX_PIPES + 20,
            segment_update_delay: 0,
            growth_speed: -1.0,
            ..Config::default()
        }
        .clamped();

        assert_eq!(cfg.fade_speed, 0.0);
        assert_eq!(cfg.spawn_rate, 1.0);
        assert_eq!(cfg.turn_probability, 0.0);
        assert_eq!(cfg.max_active_pipes, MAX_PIPES);
        assert_eq!(cfg.segment_update_delay, 1);
        assert_eq!(cfg.growth_speed, 0.0);
    }

    #[test]
    fn zero_concurrency_cap_is_valid() {
        let cfg = Config {
            max_active_pipes: 0,
            ..Config::default()
        };
        assert_eq!(cfg.clamped().max_active_pipes, 0);
    }
}
