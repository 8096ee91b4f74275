//! Bouncing note spheres.
//!
//! Eight spheres, one per note of a C major octave, drift inside a box. Each
//! time one hits an audible wall its note sounds briefly; selecting one
//! plays it longer and highlights it. The same animator drives the flat
//! percent-based scene (`D = 2`) and the 3D scene (`D = 3`, silent depth).

pub mod animator;
pub mod area;
pub mod entity;
pub mod roster;

pub use animator::{Animator, TickReport};
pub use area::{AxisBounds, AxisStep, PlayArea, reflect_axis};
pub use entity::{Activity, EntitySnapshot, MovingEntity};
pub use roster::{Placed, Placement, SeededPlacement};
