//! Play area bounds and the reflection rule.

/// Bounds of one axis. Reflections on a silent axis move the sphere but do
/// not make a sound (the depth axis of the 3D scene).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub min: f64,
    pub max: f64,
    pub audible: bool,
}

impl AxisBounds {
    pub fn new(min: f64, max: f64) -> Self {
        AxisBounds {
            min,
            max,
            audible: true,
        }
    }

    pub fn silent(min: f64, max: f64) -> Self {
        AxisBounds {
            min,
            max,
            audible: false,
        }
    }

    /// Symmetric bounds `[-half, half]`.
    pub fn centered(half: f64) -> Self {
        Self::new(-half, half)
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.min..=self.max).contains(&x)
    }

    pub fn extent(&self) -> f64 {
        self.max - self.min
    }
}

/// Result of moving one coordinate for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisStep {
    pub position: f64,
    pub velocity: f64,
    pub reflected: bool,
}

/// Move `position` by `velocity` and reflect off `bounds`.
///
/// A coordinate that would leave the axis is clamped to the bound and its
/// velocity is pointed back inside. Pointing inward (rather than negating)
/// also rescues a coordinate that started outside the bounds. Non-finite
/// velocities are treated as 0, and a NaN coordinate is re-centred.
pub fn reflect_axis(position: f64, velocity: f64, bounds: AxisBounds) -> AxisStep {
    let velocity = if velocity.is_finite() { velocity } else { 0.0 };
    let mut candidate = position + velocity;
    if candidate.is_nan() {
        candidate = (bounds.min + bounds.max) / 2.0;
    }

    if candidate > bounds.max {
        AxisStep {
            position: bounds.max,
            velocity: -velocity.abs(),
            reflected: true,
        }
    } else if candidate < bounds.min {
        AxisStep {
            position: bounds.min,
            velocity: velocity.abs(),
            reflected: true,
        }
    } else {
        AxisStep {
            position: candidate,
            velocity,
            reflected: false,
        }
    }
}

/// Axis-aligned box the roster moves in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea<const D: usize> {
    pub axes: [AxisBounds; D],
}

impl<const D: usize> PlayArea<D> {
    pub fn new(axes: [AxisBounds; D]) -> Self {
        PlayArea { axes }
    }

    pub fn contains(&self, point: &[f64; D]) -> bool {
        self.axes.iter().zip(point).all(|(b, &x)| b.contains(x))
    }
}

impl PlayArea<2> {
    /// Flat scene in percent of the container; spheres stay 5% from the edges.
    pub fn percent() -> Self {
        PlayArea::new([AxisBounds::new(5.0, 95.0), AxisBounds::new(5.0, 95.0)])
    }
}

impl PlayArea<3> {
    /// 3D scene filling a `width` x `height` viewport, with a silent depth
    /// axis of +/-3.
    pub fn viewport(width: f64, height: f64) -> Self {
        PlayArea::new([
            AxisBounds::centered(width / 2.0),
            AxisBounds::centered(height / 2.0),
            AxisBounds::silent(-3.0, 3.0),
        ])
    }
}
