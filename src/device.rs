//! Audio device: the output graph voices are scheduled on.
//!
//! The device owns a virtual clock measured in rendered frames. Voices are
//! timed tasks against that clock: they are scheduled at the current time,
//! play while `render` is pulled, and are dropped once finished or
//! cancelled. A suspended device renders silence and its clock stands
//! still, like a suspended browser audio context.

use tracing::debug;

use crate::config::SynthConfig;
use crate::dsp::mixer::Mixer;
use crate::dsp::voice::{Voice, VoiceId};
use crate::error::DeviceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Suspended,
    Running,
    Closed,
}

/// What the host hands back when it opens an output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostGrant {
    pub sample_rate: f64,
    /// Hosts with an autoplay policy open outputs suspended.
    pub starts_suspended: bool,
}

/// The platform side of audio output.
pub trait AudioHost {
    /// Open an output, or report why there is none.
    fn open(&mut self, config: &SynthConfig) -> Result<HostGrant, DeviceError>;

    /// Ask the host to let a suspended output run again.
    fn resume(&mut self) -> Result<(), DeviceError>;
}

/// Host whose output is whatever pulls [`AudioDevice::render`]: the
/// AudioWorklet in the browser, or a test natively. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineHost;

impl AudioHost for OfflineHost {
    fn open(&mut self, config: &SynthConfig) -> Result<HostGrant, DeviceError> {
        Ok(HostGrant {
            sample_rate: config.sample_rate,
            starts_suspended: false,
        })
    }

    fn resume(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

pub struct AudioDevice {
    sample_rate: f64,
    frames: u64,
    state: DeviceState,
    mixer: Mixer,
    voices: Vec<(VoiceId, Voice)>,
    next_id: u64,
}

impl AudioDevice {
    pub fn new(sample_rate: f64, master_gain: f64, state: DeviceState) -> Self {
        AudioDevice {
            sample_rate,
            frames: 0,
            state,
            mixer: Mixer::new(master_gain),
            voices: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Device clock in seconds.
    pub fn current_time(&self) -> f64 {
        self.frames as f64 / self.sample_rate
    }

    pub fn master_gain(&self) -> f64 {
        self.mixer.master_gain()
    }

    /// Set the master gain, clamped to [0, 1]. Returns the applied value.
    pub fn set_master_gain(&mut self, level: f64) -> f64 {
        self.mixer.set_master_gain(level)
    }

    /// Suspend from outside (host policy, page hidden). Resumed on the next play.
    pub fn suspend(&mut self) {
        if self.state == DeviceState::Running {
            self.state = DeviceState::Suspended;
        }
    }

    pub(crate) fn mark_running(&mut self) {
        if self.state == DeviceState::Suspended {
            self.state = DeviceState::Running;
        }
    }

    /// Stop for good, discarding every scheduled voice.
    pub fn close(&mut self) {
        let dropped = self.voices.len();
        self.voices.clear();
        self.state = DeviceState::Closed;
        debug!(dropped, "audio device closed");
    }

    /// Queue a voice. Returns `None` on a closed device.
    pub fn schedule(&mut self, voice: Voice) -> Option<VoiceId> {
        if self.state == DeviceState::Closed {
            return None;
        }
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.voices.push((id, voice));
        Some(id)
    }

    /// Remove a voice before it ends. False if it already finished or never existed.
    pub fn cancel(&mut self, id: VoiceId) -> bool {
        let before = self.voices.len();
        self.voices.retain(|(vid, _)| *vid != id);
        self.voices.len() != before
    }

    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|(vid, _)| *vid == id).map(|(_, v)| v)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Pull the next block of mono output and advance the clock.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.state != DeviceState::Running {
            out.fill(0.0);
            return;
        }

        for sample in out.iter_mut() {
            let t = self.frames as f64 / self.sample_rate;
            let sum: f64 = self.voices.iter_mut().map(|(_, v)| v.sample_at(t)).sum();
            *sample = self.mixer.output(sum);
            self.frames += 1;
        }

        self.voices.retain(|(_, v)| !v.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::NoteShape;
    use crate::dsp::oscillator::Waveform;

    const SR: f64 = 8000.0;

    fn note(device: &AudioDevice, duration: f64) -> Voice {
        let t0 = device.current_time();
        let gain = NoteShape::default().envelope(t0, duration);
        Voice::tone(Waveform::Sine, 440.0, gain, t0, t0 + duration, SR)
    }

    #[test]
    fn clock_advances_only_while_running() {
        let mut device = AudioDevice::new(SR, 0.3, DeviceState::Running);
        let mut block = [0.0f32; 800];
        device.render(&mut block);
        assert!((device.current_time() - 0.1).abs() < 1e-12);

        device.suspend();
        device.render(&mut block);
        assert!((device.current_time() - 0.1).abs() < 1e-12);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn finished_voices_are_dropped() {
        let mut device = AudioDevice::new(SR, 1.0, DeviceState::Running);
        let voice = note(&device, 0.2);
        device.schedule(voice).unwrap();
        assert_eq!(device.voice_count(), 1);

        let mut block = [0.0f32; 1600];
        device.render(&mut block[..400]);
        assert_eq!(device.voice_count(), 1);
        assert!(block[..400].iter().any(|s| s.abs() > 0.05));

        device.render(&mut block);
        assert_eq!(device.voice_count(), 0);
    }

    #[test]
    fn master_gain_scales_output() {
        let mut loud = AudioDevice::new(SR, 1.0, DeviceState::Running);
        let mut quiet = AudioDevice::new(SR, 0.25, DeviceState::Running);
        let (v1, v2) = (note(&loud, 0.5), note(&quiet, 0.5));
        loud.schedule(v1);
        quiet.schedule(v2);

        let mut a = [0.0f32; 400];
        let mut b = [0.0f32; 400];
        loud.render(&mut a);
        quiet.render(&mut b);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x * 0.25 - y).abs() < 1e-6);
        }
    }

    #[test]
    fn cancel_removes_voice() {
        let mut device = AudioDevice::new(SR, 0.3, DeviceState::Running);
        let voice = note(&device, 1.0);
        let id = device.schedule(voice).unwrap();
        assert!(device.voice(id).is_some());
        assert!(device.cancel(id));
        assert!(!device.cancel(id));

        let mut block = [1.0f32; 64];
        device.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn closed_device_refuses_voices() {
        let mut device = AudioDevice::new(SR, 0.3, DeviceState::Running);
        let voice = note(&device, 1.0);
        device.schedule(voice.clone());
        device.close();
        assert_eq!(device.state(), DeviceState::Closed);
        assert_eq!(device.voice_count(), 0);
        assert_eq!(device.schedule(voice), None);

        device.mark_running();
        assert_eq!(device.state(), DeviceState::Closed);
    }
}
