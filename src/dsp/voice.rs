//! Voice: one scheduled sound (source, optional filter, gain curve).
//!
//! A voice is created per trigger, plays between its start and stop times on
//! the device clock, and is discarded afterwards. There is no pooling.

use super::envelope::Envelope;
use super::filter::BiquadFilter;
use super::noise::NoiseBuffer;
use super::oscillator::{Oscillator, Waveform};

/// Identifies a scheduled voice on its device, e.g. for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

/// Where a voice's raw signal comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// Oscillator whose pitch follows `frequency`.
    Tone {
        oscillator: Oscillator,
        frequency: Envelope,
    },
    /// Pre-generated noise, ending when the buffer runs out.
    Noise(NoiseBuffer),
}

#[derive(Debug, Clone)]
pub struct Voice {
    source: Source,
    filter: Option<BiquadFilter>,
    gain: Envelope,
    start_time: f64,
    stop_time: f64,
    finished: bool,
}

impl Voice {
    /// Oscillator voice at a fixed pitch.
    pub fn tone(
        waveform: Waveform,
        frequency: f64,
        gain: Envelope,
        start_time: f64,
        stop_time: f64,
        sample_rate: f64,
    ) -> Self {
        let curve = Envelope::new(frequency).set(start_time, frequency);
        Self::swept(waveform, curve, gain, start_time, stop_time, sample_rate)
    }

    /// Oscillator voice whose pitch follows `frequency`.
    pub fn swept(
        waveform: Waveform,
        frequency: Envelope,
        gain: Envelope,
        start_time: f64,
        stop_time: f64,
        sample_rate: f64,
    ) -> Self {
        Voice {
            source: Source::Tone {
                oscillator: Oscillator::new(waveform, sample_rate),
                frequency,
            },
            filter: None,
            gain,
            start_time,
            stop_time,
            finished: false,
        }
    }

    /// Noise-buffer voice; it stops when the buffer has played through.
    pub fn noise(
        buffer: NoiseBuffer,
        filter: BiquadFilter,
        gain: Envelope,
        start_time: f64,
        sample_rate: f64,
    ) -> Self {
        let stop_time = start_time + buffer.duration(sample_rate);
        Voice {
            source: Source::Noise(buffer),
            filter: Some(filter),
            gain,
            start_time,
            stop_time,
            finished: false,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn filter(&self) -> Option<&BiquadFilter> {
        self.filter.as_ref()
    }

    pub fn gain(&self) -> &Envelope {
        &self.gain
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    /// Scheduled playing time, start to stop.
    pub fn duration(&self) -> f64 {
        self.stop_time - self.start_time
    }

    /// Render the sample at device time `t`. Silent before the start time;
    /// finished from the stop time on.
    pub fn sample_at(&mut self, t: f64) -> f64 {
        if self.finished || t < self.start_time {
            return 0.0;
        }
        if t >= self.stop_time {
            self.finished = true;
            return 0.0;
        }

        let raw = match &mut self.source {
            Source::Tone {
                oscillator,
                frequency,
            } => oscillator.next_sample(frequency.value_at(t)),
            Source::Noise(buffer) => match buffer.next_sample() {
                Some(s) => s,
                None => {
                    self.finished = true;
                    return 0.0;
                }
            },
        };

        let filtered = match &mut self.filter {
            Some(filter) => filter.process(raw),
            None => raw,
        };

        filtered * self.gain.value_at(t)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
