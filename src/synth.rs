//! Synthesizer: turns trigger events into short, self-terminating voices.
//!
//! The output device is built lazily on the first play request and resumed
//! whenever it is found suspended. If the host cannot provide audio output
//! the synthesizer goes quiet for good: every later play is a no-op, and
//! nothing is reported to the caller beyond a log line.

use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SynthConfig;
use crate::device::{AudioDevice, AudioHost, DeviceState, OfflineHost};
use crate::dsp::envelope::{Envelope, NoteShape};
use crate::dsp::filter::BiquadFilter;
use crate::dsp::noise::NoiseBuffer;
use crate::dsp::oscillator::Waveform;
use crate::dsp::voice::{Voice, VoiceId};
use crate::error::ParseError;

/// Default note length for `play_note`.
pub const NOTE_SECS: f64 = 0.5;
/// Default note length for `play_chord`.
pub const CHORD_SECS: f64 = 1.0;

/// The fixed percussion palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Drum {
    Kick,
    Snare,
    HiHat,
}

impl FromStr for Drum {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kick" => Ok(Drum::Kick),
            "snare" => Ok(Drum::Snare),
            "hihat" => Ok(Drum::HiHat),
            other => Err(ParseError::Drum(other.to_string())),
        }
    }
}

impl Drum {
    /// Build the voice for this drum starting at `t0`.
    fn voice(self, t0: f64, sample_rate: f64, rng: &mut StdRng) -> Voice {
        match self {
            // Sine with a fast downward pitch sweep
            Drum::Kick => {
                let pitch = Envelope::new(60.0)
                    .set(t0, 60.0)
                    .exponential_to(20.0, t0 + 0.1);
                let gain = Envelope::percussive(t0, 1.0, 0.3);
                Voice::swept(Waveform::Sine, pitch, gain, t0, t0 + 0.3, sample_rate)
            }
            Drum::Snare => {
                let noise = NoiseBuffer::white(rng, 0.2, sample_rate);
                let filter = BiquadFilter::bandpass(200.0, 1.0, sample_rate);
                let gain = Envelope::percussive(t0, 0.5, 0.2);
                Voice::noise(noise, filter, gain, t0, sample_rate)
            }
            Drum::HiHat => {
                let noise = NoiseBuffer::white(rng, 0.1, sample_rate);
                let filter = BiquadFilter::highpass(8000.0, sample_rate);
                let gain = Envelope::percussive(t0, 0.3, 0.1);
                Voice::noise(noise, filter, gain, t0, sample_rate)
            }
        }
    }
}

/// Something that can make a short tone. The animator only knows this.
///
/// Implementations must not panic and should be cheap: it is called from
/// the frame loop.
pub trait ToneTrigger {
    fn trigger(&mut self, frequency: f64, duration: f64);
}

impl<F: FnMut(f64, f64)> ToneTrigger for F {
    fn trigger(&mut self, frequency: f64, duration: f64) {
        self(frequency, duration)
    }
}

enum DeviceSlot {
    Uninitialized,
    /// The host refused to open an output; stay silent.
    Unavailable,
    Ready(AudioDevice),
    /// Shut down explicitly.
    Disposed,
}

pub struct Synthesizer<H: AudioHost = OfflineHost> {
    config: SynthConfig,
    host: H,
    slot: DeviceSlot,
    note_shape: NoteShape,
    noise_rng: StdRng,
}

impl Synthesizer<OfflineHost> {
    pub fn new(config: SynthConfig) -> Self {
        Self::with_host(config, OfflineHost)
    }
}

impl<H: AudioHost> Synthesizer<H> {
    pub fn with_host(config: SynthConfig, host: H) -> Self {
        let noise_rng = StdRng::seed_from_u64(config.noise_seed);
        Synthesizer {
            config,
            host,
            slot: DeviceSlot::Uninitialized,
            note_shape: NoteShape::default(),
            noise_rng,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The device, once constructed and until shutdown.
    pub fn device(&self) -> Option<&AudioDevice> {
        match &self.slot {
            DeviceSlot::Ready(device) => Some(device),
            _ => None,
        }
    }

    pub fn device_mut(&mut self) -> Option<&mut AudioDevice> {
        match &mut self.slot {
            DeviceSlot::Ready(device) => Some(device),
            _ => None,
        }
    }

    /// True once the host has refused to provide output.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.slot, DeviceSlot::Unavailable)
    }

    /// Bring the device to the running state. Idempotent.
    pub fn ensure_ready(&mut self) {
        if let DeviceSlot::Uninitialized = self.slot {
            self.slot = match self.host.open(&self.config) {
                Ok(grant) => {
                    let state = if grant.starts_suspended {
                        DeviceState::Suspended
                    } else {
                        DeviceState::Running
                    };
                    debug!(sample_rate = grant.sample_rate, ?state, "audio device created");
                    DeviceSlot::Ready(AudioDevice::new(
                        grant.sample_rate,
                        self.config.master_gain,
                        state,
                    ))
                }
                Err(e) => {
                    warn!("audio output unavailable, synth stays silent: {e}");
                    DeviceSlot::Unavailable
                }
            };
        }

        if let DeviceSlot::Ready(device) = &mut self.slot {
            if device.state() == DeviceState::Suspended {
                match self.host.resume() {
                    Ok(()) => device.mark_running(),
                    Err(e) => warn!("audio device resume failed: {e}"),
                }
            }
        }
    }

    /// Ensure ready, then hand out the device only if it is actually running.
    fn running_device(&mut self) -> Option<&mut AudioDevice> {
        self.ensure_ready();
        match &mut self.slot {
            DeviceSlot::Ready(device) if device.state() == DeviceState::Running => Some(device),
            _ => None,
        }
    }

    /// Play one oscillator note with the four-stage envelope.
    ///
    /// Returns `None` when the sound was dropped: bad parameters, or no
    /// running device.
    pub fn play_note(
        &mut self,
        frequency: f64,
        duration: f64,
        waveform: Waveform,
    ) -> Option<VoiceId> {
        if !is_positive(frequency) || !is_positive(duration) {
            debug!(frequency, duration, "note dropped: invalid parameters");
            return None;
        }

        let shape = self.note_shape;
        let Some(device) = self.running_device() else {
            debug!(frequency, "note dropped: no running device");
            return None;
        };

        let t0 = device.current_time();
        let voice = Voice::tone(
            waveform,
            frequency,
            shape.envelope(t0, duration),
            t0,
            t0 + duration,
            device.sample_rate(),
        );
        device.schedule(voice)
    }

    /// Play every frequency as an independent sine note.
    pub fn play_chord(&mut self, frequencies: &[f64], duration: f64) -> Vec<VoiceId> {
        frequencies
            .iter()
            .filter_map(|&frequency| self.play_note(frequency, duration, Waveform::Sine))
            .collect()
    }

    pub fn play_drum(&mut self, drum: Drum) -> Option<VoiceId> {
        self.ensure_ready();
        let device = match &mut self.slot {
            DeviceSlot::Ready(device) if device.state() == DeviceState::Running => device,
            _ => {
                debug!(?drum, "drum dropped: no running device");
                return None;
            }
        };

        let voice = drum.voice(device.current_time(), device.sample_rate(), &mut self.noise_rng);
        device.schedule(voice)
    }

    /// Set the shared output gain, clamped to [0, 1]. Does nothing before
    /// the device exists.
    pub fn set_master_volume(&mut self, level: f64) {
        match &mut self.slot {
            DeviceSlot::Ready(device) => {
                let applied = device.set_master_gain(level);
                debug!(requested = level, applied, "master volume set");
            }
            _ => debug!(level, "master volume ignored: no device yet"),
        }
    }

    /// Pull the next block of output. Silence without a running device.
    pub fn render(&mut self, out: &mut [f32]) {
        match &mut self.slot {
            DeviceSlot::Ready(device) => device.render(out),
            _ => out.fill(0.0),
        }
    }

    /// Close the device and discard in-flight voices. Later plays are no-ops.
    pub fn shutdown(&mut self) {
        if let DeviceSlot::Ready(device) = &mut self.slot {
            device.close();
        }
        self.slot = DeviceSlot::Disposed;
    }
}

impl<H: AudioHost> ToneTrigger for Synthesizer<H> {
    fn trigger(&mut self, frequency: f64, duration: f64) {
        self.play_note(frequency, duration, Waveform::Sine);
    }
}

fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HostGrant;
    use crate::dsp::envelope::{EXP_FLOOR, Ramp};
    use crate::dsp::filter::FilterType;
    use crate::dsp::voice::Source;
    use crate::error::DeviceError;

    /// Host that counts calls and can be told to refuse.
    #[derive(Default)]
    struct ScriptedHost {
        opens: usize,
        resumes: usize,
        refuse_open: bool,
        refuse_resume: bool,
        start_suspended: bool,
    }

    impl AudioHost for ScriptedHost {
        fn open(&mut self, config: &SynthConfig) -> Result<HostGrant, DeviceError> {
            self.opens += 1;
            if self.refuse_open {
                return Err(DeviceError::Unavailable("no audio in this sandbox".into()));
            }
            Ok(HostGrant {
                sample_rate: config.sample_rate,
                starts_suspended: self.start_suspended,
            })
        }

        fn resume(&mut self) -> Result<(), DeviceError> {
            self.resumes += 1;
            if self.refuse_resume {
                return Err(DeviceError::ResumeRejected("no user gesture yet".into()));
            }
            Ok(())
        }
    }

    fn config() -> SynthConfig {
        SynthConfig {
            sample_rate: 8000.0,
            ..SynthConfig::default()
        }
    }

    fn render_secs<H: AudioHost>(synth: &mut Synthesizer<H>, seconds: f64) -> Vec<f32> {
        let mut out = vec![0.0f32; (seconds * synth.config().sample_rate) as usize];
        synth.render(&mut out);
        out
    }

    #[test]
    fn ensure_ready_constructs_once() {
        let mut synth = Synthesizer::with_host(config(), ScriptedHost::default());
        synth.ensure_ready();
        synth.ensure_ready();
        assert_eq!(synth.host().opens, 1);
        let device = synth.device().unwrap();
        assert_eq!(device.state(), DeviceState::Running);
        assert_eq!(device.master_gain(), 0.3);
    }

    #[test]
    fn suspended_device_is_resumed_on_play() {
        let host = ScriptedHost {
            start_suspended: true,
            ..ScriptedHost::default()
        };
        let mut synth = Synthesizer::with_host(config(), host);
        assert!(synth.play_note(440.0, 0.5, Waveform::Sine).is_some());
        assert_eq!(synth.host().resumes, 1);

        synth.device_mut().unwrap().suspend();
        assert!(synth.play_note(440.0, 0.5, Waveform::Sine).is_some());
        assert_eq!(synth.host().resumes, 2);
        assert_eq!(synth.device().unwrap().state(), DeviceState::Running);
    }

    #[test]
    fn rejected_resume_drops_sound() {
        let host = ScriptedHost {
            start_suspended: true,
            refuse_resume: true,
            ..ScriptedHost::default()
        };
        let mut synth = Synthesizer::with_host(config(), host);
        assert_eq!(synth.play_note(440.0, 0.5, Waveform::Sine), None);
        assert_eq!(synth.play_drum(Drum::Kick), None);
        assert_eq!(synth.device().unwrap().voice_count(), 0);
        assert_eq!(synth.device().unwrap().state(), DeviceState::Suspended);
    }

    #[test]
    fn unavailable_output_is_silent_and_not_retried() {
        let host = ScriptedHost {
            refuse_open: true,
            ..ScriptedHost::default()
        };
        let mut synth = Synthesizer::with_host(config(), host);
        assert_eq!(synth.play_note(440.0, 0.5, Waveform::Sine), None);
        assert!(synth.play_chord(&[261.63, 329.63], 1.0).is_empty());
        assert_eq!(synth.play_drum(Drum::Snare), None);
        synth.set_master_volume(0.9);
        synth.trigger(440.0, 0.2);

        assert!(synth.is_unavailable());
        assert_eq!(synth.host().opens, 1);
        assert!(render_secs(&mut synth, 0.1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn note_envelope_spans_duration() {
        let mut synth = Synthesizer::new(config());
        synth.ensure_ready();
        render_secs(&mut synth, 0.25);

        let id = synth.play_note(392.0, 1.0, Waveform::Triangle).unwrap();
        let voice = synth.device().unwrap().voice(id).unwrap();
        let t0 = voice.start_time();
        assert!((t0 - 0.25).abs() < 1e-9);
        assert!((voice.duration() - 1.0).abs() < 1e-9);

        let gain = voice.gain();
        assert!((gain.end_time().unwrap() - (t0 + 1.0)).abs() < 1e-9);
        assert!((gain.value_at(t0 + 0.01) - 0.8).abs() < 1e-9);
        assert!((gain.value_at(t0 + 0.11) - 0.3).abs() < 1e-9);
        assert!((gain.value_at(t0 + 0.6) - 0.3).abs() < 1e-9);
        assert_eq!(gain.value_at(t0 + 1.0), 0.0);
        match voice.source() {
            Source::Tone { oscillator, .. } => assert_eq!(oscillator.waveform, Waveform::Triangle),
            Source::Noise(_) => panic!("note should be an oscillator voice"),
        }
    }

    #[test]
    fn short_note_still_stops_at_duration() {
        let mut synth = Synthesizer::new(config());
        let id = synth.play_note(440.0, 0.1, Waveform::Sine).unwrap();
        let voice = synth.device().unwrap().voice(id).unwrap();
        assert!((voice.stop_time() - 0.1).abs() < 1e-12);

        let out = render_secs(&mut synth, 0.2);
        assert!(out[(0.1 * 8000.0) as usize..].iter().all(|&s| s == 0.0));
        assert_eq!(synth.device().unwrap().voice_count(), 0);
    }

    #[test]
    fn note_between_decay_and_release_spans_duration() {
        let mut synth = Synthesizer::new(config());
        let id = synth.play_note(330.0, 0.35, Waveform::Sine).unwrap();
        let voice = synth.device().unwrap().voice(id).unwrap();
        let t0 = voice.start_time();

        assert!((voice.stop_time() - (t0 + 0.35)).abs() < 1e-12);
        assert!((voice.gain().end_time().unwrap() - (t0 + 0.35)).abs() < 1e-12);
        assert_eq!(voice.gain().value_at(t0 + 0.35), 0.0);
    }

    #[test]
    fn invalid_parameters_are_dropped() {
        let mut synth = Synthesizer::new(config());
        assert_eq!(synth.play_note(0.0, 0.5, Waveform::Sine), None);
        assert_eq!(synth.play_note(440.0, -1.0, Waveform::Sine), None);
        assert_eq!(synth.play_note(f64::NAN, 0.5, Waveform::Sine), None);
        assert_eq!(synth.play_note(440.0, f64::INFINITY, Waveform::Sine), None);
    }

    #[test]
    fn chord_plays_each_frequency() {
        let mut synth = Synthesizer::new(config());
        let ids = synth.play_chord(&[261.63, 329.63, 392.0], CHORD_SECS);
        assert_eq!(ids.len(), 3);

        let device = synth.device().unwrap();
        for id in ids {
            let voice = device.voice(id).unwrap();
            assert!((voice.duration() - CHORD_SECS).abs() < 1e-12);
        }
    }

    #[test]
    fn snare_recipe() {
        let mut synth = Synthesizer::new(config());
        let id = synth.play_drum(Drum::Snare).unwrap();
        let voice = synth.device().unwrap().voice(id).unwrap();

        assert!((voice.duration() - 0.2).abs() < 1e-9);
        let filter = voice.filter().unwrap();
        assert_eq!(filter.filter_type(), FilterType::Bandpass);
        assert_eq!(filter.frequency(), 200.0);
        assert_eq!(filter.q(), 1.0);

        let points = voice.gain().breakpoints();
        assert_eq!(points[0].value, 0.5);
        assert_eq!(points[1].ramp, Ramp::Exponential);
        assert_eq!(points[1].value, EXP_FLOOR);
        assert!((points[1].time - 0.2).abs() < 1e-12);
    }

    #[test]
    fn hihat_recipe() {
        let mut synth = Synthesizer::new(config());
        let id = synth.play_drum(Drum::HiHat).unwrap();
        let voice = synth.device().unwrap().voice(id).unwrap();

        assert!((voice.duration() - 0.1).abs() < 1e-9);
        let filter = voice.filter().unwrap();
        assert_eq!(filter.filter_type(), FilterType::Highpass);
        assert_eq!(filter.frequency(), 8000.0);
        assert_eq!(voice.gain().value_at(0.0), 0.3);
        assert!((voice.gain().value_at(0.1) - EXP_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn kick_recipe() {
        let mut synth = Synthesizer::new(config());
        let id = synth.play_drum(Drum::Kick).unwrap();
        let voice = synth.device().unwrap().voice(id).unwrap();

        assert!((voice.duration() - 0.3).abs() < 1e-12);
        assert!(voice.filter().is_none());
        let Source::Tone { oscillator, frequency } = voice.source() else {
            panic!("kick should be an oscillator voice");
        };
        assert_eq!(oscillator.waveform, Waveform::Sine);
        assert_eq!(frequency.value_at(0.0), 60.0);
        assert!((frequency.value_at(0.1) - 20.0).abs() < 1e-9);
        assert!((frequency.value_at(0.2) - 20.0).abs() < 1e-9);
        assert_eq!(voice.gain().value_at(0.0), 1.0);
        assert!((voice.gain().value_at(0.3) - EXP_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn drums_are_audible() {
        for drum in [Drum::Kick, Drum::Snare, Drum::HiHat] {
            let mut synth = Synthesizer::new(SynthConfig {
                master_gain: 1.0,
                ..SynthConfig::default()
            });
            synth.play_drum(drum).unwrap();
            let out = render_secs(&mut synth, 0.05);
            let peak = out.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            assert!(peak > 0.01, "{drum:?} should be audible, peak {peak}");
        }
    }

    #[test]
    fn seeded_noise_is_reproducible() {
        let mut a = Synthesizer::new(config());
        let mut b = Synthesizer::new(config());
        a.play_drum(Drum::Snare);
        b.play_drum(Drum::Snare);
        assert_eq!(render_secs(&mut a, 0.2), render_secs(&mut b, 0.2));
    }

    #[test]
    fn master_volume_clamps() {
        let mut synth = Synthesizer::new(config());
        synth.set_master_volume(0.8);
        assert!(synth.device().is_none(), "volume alone must not build the device");

        synth.ensure_ready();
        for (requested, expected) in [(-0.5, 0.0), (0.0, 0.0), (0.42, 0.42), (1.0, 1.0), (3.0, 1.0)] {
            synth.set_master_volume(requested);
            assert_eq!(synth.device().unwrap().master_gain(), expected);
        }
    }

    #[test]
    fn shutdown_discards_voices_and_silences() {
        let mut synth = Synthesizer::new(config());
        synth.play_note(440.0, 2.0, Waveform::Sine).unwrap();
        synth.shutdown();

        assert!(synth.device().is_none());
        assert_eq!(synth.play_note(440.0, 0.5, Waveform::Sine), None);
        assert!(render_secs(&mut synth, 0.1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn closures_are_tone_triggers() {
        let mut calls = Vec::new();
        let mut record = |f: f64, d: f64| calls.push((f, d));
        record.trigger(349.23, 0.5);
        assert_eq!(calls, vec![(349.23, 0.5)]);
    }

    #[test]
    fn drum_names() {
        assert_eq!("hihat".parse::<Drum>(), Ok(Drum::HiHat));
        assert_eq!("tom".parse::<Drum>(), Err(ParseError::Drum("tom".into())));
    }
}
