use serde::Serialize;

use super::area::{PlayArea, reflect_axis};

/// Highlight state of a sphere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Activity {
    #[default]
    Idle,
    /// Highlighted until the wall-clock time `until_ms`.
    Active { until_ms: f64 },
}

/// One bouncing sphere, bound to a note.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingEntity<const D: usize> {
    pub id: usize,
    pub label: &'static str,
    pub color: &'static str,
    pub frequency: f64,
    /// Sprite size multiplier.
    pub scale: f64,
    pub position: [f64; D],
    /// Displacement per tick.
    pub velocity: [f64; D],
    pub activity: Activity,
}

impl<const D: usize> MovingEntity<D> {
    /// Advance one tick inside `area`. Returns whether a wall on an audible
    /// axis was hit; a corner counts once.
    pub fn step(&mut self, area: &PlayArea<D>) -> bool {
        let mut bounced = false;
        for (axis, bounds) in area.axes.iter().enumerate() {
            let step = reflect_axis(self.position[axis], self.velocity[axis], *bounds);
            self.position[axis] = step.position;
            self.velocity[axis] = step.velocity;
            bounced |= step.reflected && bounds.audible;
        }
        bounced
    }

    pub fn activate(&mut self, now_ms: f64, window_ms: f64) {
        self.activity = Activity::Active {
            until_ms: now_ms + window_ms,
        };
    }

    /// Drop the highlight once its window has passed.
    pub fn expire(&mut self, now_ms: f64) {
        if let Activity::Active { until_ms } = self.activity {
            if now_ms >= until_ms {
                self.activity = Activity::Idle;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.activity, Activity::Active { .. })
    }

    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            label: self.label,
            color: self.color,
            frequency: self.frequency,
            scale: self.scale,
            position: self.position.to_vec(),
            active: self.is_active(),
        }
    }
}

/// What the page needs to draw a sphere.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    pub id: usize,
    pub label: &'static str,
    pub color: &'static str,
    pub frequency: f64,
    pub scale: f64,
    pub position: Vec<f64>,
    pub active: bool,
}
