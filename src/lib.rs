pub mod config;
pub mod device;
pub mod dsp;
pub mod error;
pub mod scale;
pub mod scene;
pub mod synth;

use std::str::FromStr;

use tracing::info;
use wasm_bindgen::prelude::*;

use crate::config::{AreaConfig, StudioConfig};
use crate::dsp::oscillator::Waveform;
use crate::error::Error;
use crate::scale::ScaleMode;
use crate::scene::{Animator, EntitySnapshot, PlayArea, SeededPlacement, TickReport};
use crate::synth::{CHORD_SECS, Drum, NOTE_SECS, Synthesizer};

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the orbsong-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: seven frequencies of a scale starting at `root`.
#[wasm_bindgen]
pub fn generate_scale(root: f64, mode: &str) -> Result<Vec<f64>, JsValue> {
    let mode = ScaleMode::from_str(mode).map_err(to_js)?;
    Ok(scale::generate_scale(root, mode))
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

enum Scene {
    Flat(Animator<2>),
    Deep(Animator<3>),
}

/// The sphere toy as the page mounts it: one synthesizer, one scene.
///
/// Lives on the page's main thread: `tick` runs from `requestAnimationFrame`,
/// `select` from click handlers, and `render` from a main-thread audio
/// callback that pulls output blocks.
#[wasm_bindgen]
pub struct Studio {
    synth: Synthesizer,
    scene: Scene,
}

impl Studio {
    pub fn from_config(config: StudioConfig) -> Result<Studio, Error> {
        config.validate()?;
        let mut placement = SeededPlacement::new(config.placement_seed);
        let scene = match config.area {
            AreaConfig::Percent => Scene::Flat(Animator::new(
                PlayArea::percent(),
                config.animator.clone(),
                &mut placement,
            )),
            AreaConfig::Viewport { width, height } => Scene::Deep(Animator::new(
                PlayArea::viewport(width, height),
                config.animator.clone(),
                &mut placement,
            )),
        };
        info!(area = ?config.area, seed = config.placement_seed, "studio mounted");
        Ok(Studio {
            synth: Synthesizer::new(config.synth),
            scene,
        })
    }

    pub fn from_json(json: &str) -> Result<Studio, Error> {
        Self::from_config(StudioConfig::from_json(json)?)
    }

    pub fn synth(&self) -> &Synthesizer {
        &self.synth
    }

    /// Advance the scene one frame, sounding bounces on the synthesizer.
    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        match &mut self.scene {
            Scene::Flat(anim) => anim.tick(now_ms, &mut self.synth),
            Scene::Deep(anim) => anim.tick(now_ms, &mut self.synth),
        }
    }

    pub fn select(&mut self, id: usize, now_ms: f64) -> Result<(), Error> {
        match &mut self.scene {
            Scene::Flat(anim) => anim.select(id, now_ms, &mut self.synth)?,
            Scene::Deep(anim) => anim.select(id, now_ms, &mut self.synth)?,
        }
        Ok(())
    }

    /// Play a note by waveform name, sine and [`NOTE_SECS`] when omitted.
    /// `Ok(false)` means the sound was dropped.
    pub fn play_named_note(
        &mut self,
        frequency: f64,
        duration: Option<f64>,
        waveform: Option<&str>,
    ) -> Result<bool, Error> {
        let waveform = waveform.map(Waveform::from_str).transpose()?.unwrap_or_default();
        let duration = duration.unwrap_or(NOTE_SECS);
        Ok(self.synth.play_note(frequency, duration, waveform).is_some())
    }

    /// Sine chord, [`CHORD_SECS`] long when no duration is given. Returns
    /// how many tones were scheduled.
    pub fn play_chord(&mut self, frequencies: &[f64], duration: Option<f64>) -> usize {
        self.synth.play_chord(frequencies, duration.unwrap_or(CHORD_SECS)).len()
    }

    pub fn play_named_drum(&mut self, name: &str) -> Result<bool, Error> {
        let drum = Drum::from_str(name)?;
        Ok(self.synth.play_drum(drum).is_some())
    }

    pub fn snapshots(&self) -> Vec<EntitySnapshot> {
        match &self.scene {
            Scene::Flat(anim) => anim.entities().iter().map(|e| e.snapshot()).collect(),
            Scene::Deep(anim) => anim.entities().iter().map(|e| e.snapshot()).collect(),
        }
    }
}

#[wasm_bindgen]
impl Studio {
    /// Mount from a JSON config string; `"{}"` gives the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Studio, JsValue> {
        Studio::from_json(config_json).map_err(to_js)
    }

    /// Returns the ids of spheres that bounced this frame.
    #[wasm_bindgen(js_name = tick)]
    pub fn tick_js(&mut self, now_ms: f64) -> Vec<u32> {
        self.tick(now_ms).bounced.into_iter().map(|id| id as u32).collect()
    }

    #[wasm_bindgen(js_name = select)]
    pub fn select_js(&mut self, id: u32, now_ms: f64) -> Result<(), JsValue> {
        self.select(id as usize, now_ms).map_err(to_js)
    }

    /// Returns whether the note was actually scheduled.
    #[wasm_bindgen(js_name = playNote)]
    pub fn play_note_js(
        &mut self,
        frequency: f64,
        duration: Option<f64>,
        waveform: Option<String>,
    ) -> Result<bool, JsValue> {
        self.play_named_note(frequency, duration, waveform.as_deref()).map_err(to_js)
    }

    #[wasm_bindgen(js_name = playChord)]
    pub fn play_chord_js(&mut self, frequencies: &[f64], duration: Option<f64>) -> u32 {
        self.play_chord(frequencies, duration) as u32
    }

    #[wasm_bindgen(js_name = playDrum)]
    pub fn play_drum_js(&mut self, name: &str) -> Result<bool, JsValue> {
        self.play_named_drum(name).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setMasterVolume)]
    pub fn set_master_volume(&mut self, level: f64) {
        self.synth.set_master_volume(level);
    }

    /// Host-side suspension (tab hidden). The next play resumes.
    pub fn suspend(&mut self) {
        if let Some(device) = self.synth.device_mut() {
            device.suspend();
        }
    }

    pub fn render(&mut self, out: &mut [f32]) {
        self.synth.render(out);
    }

    /// Sphere positions and highlight state for drawing.
    #[wasm_bindgen(js_name = entities)]
    pub fn entities_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.snapshots()).map_err(to_js)
    }

    pub fn shutdown(&mut self) {
        self.synth.shutdown();
    }
}
