use crate::grid::OccupancyGrid;
use glam::IVec3;
use rand::Rng;

/// One of the six axis-aligned unit headings a pipe can travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Heading {
    pub const ALL: [Heading; 6] = [
        Heading::PosX,
        Heading::NegX,
        Heading::PosY,
        Heading::NegY,
        Heading::PosZ,
        Heading::NegZ,
    ];

    /// Grid-space step vector for one segment in this heading.
    pub fn delta(self) -> IVec3 {
        match self {
            Heading::PosX => IVec3::new(1, 0, 0),
            Heading::NegX => IVec3::new(-1, 0, 0),
            Heading::PosY => IVec3::new(0, 1, 0),
            Heading::NegY => IVec3::new(0, -1, 0),
            Heading::PosZ => IVec3::new(0, 0, 1),
            Heading::NegZ => IVec3::new(0, 0, -1),
        }
    }

    /// The exact opposite heading.
    pub fn reverse(self) -> Heading {
        match self {
            Heading::PosX => Heading::NegX,
            Heading::NegX => Heading::PosX,
            Heading::PosY => Heading::NegY,
            Heading::NegY => Heading::PosY,
            Heading::PosZ => Heading::NegZ,
            Heading::NegZ => Heading::PosZ,
        }
    }

    /// Draws one of the six headings uniformly at random.
    pub fn random(rng: &mut impl Rng) -> Heading {
        Heading::ALL[rng.random_range(0..Heading::ALL.len())]
    }
}

/// Behavior of [`choose_heading`] when no non-reversing free candidate exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Relax the no-reversal rule and retry; the reverse heading is taken
    /// if (and only if) its target cell is free.
    AllowReversal,
    /// Report no candidate; the caller keeps its current heading.
    #[default]
    ContinueStraight,
}

/// Chooses the next heading for a pipe at `pos` currently travelling along
/// `current`.
///
/// Candidates are the six axis-aligned headings minus the exact reverse of
/// `current`, filtered to those whose target cell is free on `grid`; one
/// survivor is picked uniformly at random. With zero survivors the result
/// is governed by `policy`: `AllowReversal` may return the reverse heading,
/// `ContinueStraight` returns `None` and the caller's heading stands.
pub fn choose_heading(
    grid: &OccupancyGrid,
    pos: IVec3,
    current: Heading,
    policy: FallbackPolicy,
    rng: &mut impl Rng,
) -> Option<Heading> {
    let mut candidates = Vec::with_capacity(6);
    for h in Heading::ALL {
        if h == current.reverse() {
            continue;
        }
        if grid.is_free(pos + h.delta()) {
            candidates.push(h);
        }
    }

    if candidates.is_empty() {
        return match policy {
            FallbackPolicy::AllowReversal => {
                let back = current.reverse();
                grid.is_free(pos + back.delta()).then_some(back)
            }
            FallbackPolicy::ContinueStraight => None,
        };
    }

    Some(candidates[rng.random_range(0..candidates.len())])
}
