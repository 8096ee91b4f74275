//! Envelopes as automation curves.
//!
//! An envelope is an ordered list of breakpoints. Each breakpoint either
//! jumps to a value or ramps (linearly or exponentially) from the previous
//! breakpoint to its own value. The same curve drives a voice's gain and,
//! for the kick, its pitch.
//!
//! Breakpoints are kept sorted by time with stable insertion, so a curve
//! whose stages were requested out of order (a note shorter than its own
//! attack + decay + release) simply has overlapping stages instead of
//! failing.

/// Floor used by exponential decays; an exponential ramp can never reach 0.
pub const EXP_FLOOR: f64 = 0.001;

/// How the curve moves from the previous breakpoint to this one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ramp {
    /// Hold the previous value, then jump at `time`.
    Step,
    Linear,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakpoint {
    /// Absolute time in seconds on the device clock.
    pub time: f64,
    pub value: f64,
    pub ramp: Ramp,
}

/// A piecewise automation curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Value before the first breakpoint.
    initial: f64,
    points: Vec<Breakpoint>,
}

impl Envelope {
    pub fn new(initial: f64) -> Self {
        Envelope {
            initial,
            points: Vec::new(),
        }
    }

    /// Jump to `value` at `time`.
    pub fn set(mut self, time: f64, value: f64) -> Self {
        self.insert(Breakpoint {
            time,
            value,
            ramp: Ramp::Step,
        });
        self
    }

    /// Ramp linearly from the previous breakpoint, arriving at `value` at `time`.
    pub fn linear_to(mut self, value: f64, time: f64) -> Self {
        self.insert(Breakpoint {
            time,
            value,
            ramp: Ramp::Linear,
        });
        self
    }

    /// Ramp exponentially from the previous breakpoint, arriving at `value` at `time`.
    pub fn exponential_to(mut self, value: f64, time: f64) -> Self {
        self.insert(Breakpoint {
            time,
            value,
            ramp: Ramp::Exponential,
        });
        self
    }

    /// Fixed-level hit that decays exponentially to [`EXP_FLOOR`] over `span` seconds.
    pub fn percussive(start: f64, level: f64, span: f64) -> Self {
        Envelope::new(level)
            .set(start, level)
            .exponential_to(EXP_FLOOR, start + span)
    }

    fn insert(&mut self, point: Breakpoint) {
        let idx = self.points.partition_point(|p| p.time <= point.time);
        self.points.insert(idx, point);
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// Time of the last breakpoint; the curve is constant afterwards.
    pub fn end_time(&self) -> Option<f64> {
        self.points.last().map(|p| p.time)
    }

    /// Evaluate the curve at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        let mut prev: Option<(f64, f64)> = None;

        for point in &self.points {
            if point.time <= t {
                prev = Some((point.time, point.value));
                continue;
            }

            // `t` falls between `prev` and this breakpoint
            let Some((t0, v0)) = prev else {
                return self.initial;
            };
            let progress = (t - t0) / (point.time - t0);
            return match point.ramp {
                Ramp::Step => v0,
                Ramp::Linear => v0 + (point.value - v0) * progress,
                Ramp::Exponential => {
                    // Undefined across zero or from zero: hold, as WebAudio does
                    if v0 * point.value <= 0.0 {
                        v0
                    } else {
                        v0 * (point.value / v0).powf(progress)
                    }
                }
            };
        }

        prev.map_or(self.initial, |(_, v)| v)
    }
}

/// The fixed four-stage amplitude shape used for melodic notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteShape {
    pub attack: f64,
    pub peak: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for NoteShape {
    fn default() -> Self {
        NoteShape {
            attack: 0.01,
            peak: 0.8,
            decay: 0.1,
            sustain: 0.3,
            release: 0.3,
        }
    }
}

impl NoteShape {
    /// Gain curve for a note starting at `start` and lasting `duration` seconds.
    ///
    /// Silence at `start`, linear attack to `peak`, linear decay to `sustain`,
    /// hold until `duration - release`, linear release to 0 at `start + duration`.
    pub fn envelope(&self, start: f64, duration: f64) -> Envelope {
        Envelope::new(0.0)
            .set(start, 0.0)
            .linear_to(self.peak, start + self.attack)
            .linear_to(self.sustain, start + self.attack + self.decay)
            .set(start + duration - self.release, self.sustain)
            .linear_to(0.0, start + duration)
    }
}
