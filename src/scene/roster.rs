//! The fixed roster of eight note spheres and how they are first placed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::area::PlayArea;
use super::entity::{Activity, MovingEntity};

pub const ROSTER_SIZE: usize = 8;

/// One octave of C major, C4 to C5.
pub const NOTE_LABELS: [&str; ROSTER_SIZE] = ["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"];

pub const NOTE_FREQUENCIES: [f64; ROSTER_SIZE] =
    [261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88, 523.25];

pub const COLORS: [&str; ROSTER_SIZE] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeaa7", "#fd79a8", "#fdcb6e", "#6c5ce7",
];

/// Initial motion of one roster slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placed<const D: usize> {
    pub position: [f64; D],
    pub velocity: [f64; D],
    pub scale: f64,
}

/// Decides where each sphere starts.
pub trait Placement<const D: usize> {
    fn place(&mut self, index: usize, area: &PlayArea<D>) -> Placed<D>;
}

impl<const D: usize, F: FnMut(usize) -> Placed<D>> Placement<D> for F {
    fn place(&mut self, index: usize, _area: &PlayArea<D>) -> Placed<D> {
        self(index)
    }
}

/// Random placement from a fixed seed, so a page reload looks the same.
pub struct SeededPlacement {
    rng: StdRng,
}

impl SeededPlacement {
    pub fn new(seed: u64) -> Self {
        SeededPlacement {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `(u - 0.5) * span` for a uniform `u` in [0, 1).
    fn centered(&mut self, span: f64) -> f64 {
        (self.rng.random::<f64>() - 0.5) * span
    }
}

impl Placement<2> for SeededPlacement {
    /// Anywhere at least 5 units inside the walls, drifting up to 0.25 per tick.
    fn place(&mut self, _index: usize, area: &PlayArea<2>) -> Placed<2> {
        let mut position = [0.0; 2];
        for (p, bounds) in position.iter_mut().zip(&area.axes) {
            let (lo, hi) = (bounds.min + 5.0, bounds.max - 5.0);
            *p = if lo < hi {
                self.rng.random_range(lo..=hi)
            } else {
                (bounds.min + bounds.max) / 2.0
            };
        }
        let velocity = [
            self.rng.random_range(-0.25..=0.25),
            self.rng.random_range(-0.25..=0.25),
        ];
        Placed {
            position,
            velocity,
            scale: self.rng.random_range(0.8..=1.2),
        }
    }
}

impl Placement<3> for SeededPlacement {
    fn place(&mut self, _index: usize, area: &PlayArea<3>) -> Placed<3> {
        let [x, y, _] = area.axes;
        let position = [
            self.centered(x.extent() * 0.8),
            self.centered(y.extent() * 0.8),
            self.centered(4.0),
        ];
        let velocity = [self.centered(0.02), self.centered(0.02), self.centered(0.01)];
        Placed {
            position,
            velocity,
            scale: self.rng.random_range(0.3..=0.7),
        }
    }
}

/// Build the eight spheres in note order.
pub fn build<const D: usize, P>(area: &PlayArea<D>, placement: &mut P) -> Vec<MovingEntity<D>>
where
    P: Placement<D> + ?Sized,
{
    (0..ROSTER_SIZE)
        .map(|id| {
            let Placed {
                position,
                velocity,
                scale,
            } = placement.place(id, area);
            MovingEntity {
                id,
                label: NOTE_LABELS[id],
                color: COLORS[id],
                frequency: NOTE_FREQUENCIES[id],
                scale,
                position,
                velocity,
                activity: Activity::Idle,
            }
        })
        .collect()
}
