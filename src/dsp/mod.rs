//! DSP building blocks: pure Rust synthesis for the sphere toy's voices.
//!
//! Everything renders sample by sample against the device clock, so the
//! same code feeds the browser's AudioWorklet (via WASM) and native tests.

pub mod envelope;
pub mod filter;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod voice;
