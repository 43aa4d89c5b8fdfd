//! Aditivo Synth - Polyphonic additive synthesis engine
//!
//! This crate builds tones by summing sine harmonics at integer multiples of
//! a fundamental frequency, shaped by an ADSR envelope and mixed across a
//! fixed pool of voices.
//!
//! # Core Components
//!
//! ## Harmonic Bank
//!
//! Per-voice bank of phase-accumulating sine oscillators:
//!
//! - [`HarmonicBank`] - Oscillators at integer multiples of a fundamental
//! - [`cents_to_ratio`] / [`normalization_scale`] - Detune and gain math
//!
//! Harmonics at or above the Nyquist frequency are gated out of both the
//! mix and the normalization sum, so high notes lose partials instead of
//! aliasing.
//!
//! ## Envelopes
//!
//! - [`AdsrEnvelope`] - Attack-Decay-Sustain-Release envelope
//! - [`EnvelopeParams`] - Timing parameters in seconds
//! - [`EnvelopeState`] - Envelope stage tracking
//!
//! ```rust
//! use aditivo_synth::{AdsrEnvelope, EnvelopeParams};
//!
//! let mut env = AdsrEnvelope::new(48000.0);
//! env.set_params(EnvelopeParams::new(0.01, 0.1, 0.7, 0.2));
//!
//! env.gate_on();
//! let level = env.advance();
//! ```
//!
//! ## Engine
//!
//! - [`AdditiveEngine`] - Voice pool, parameter staging, stereo render loop
//! - [`Voice`] - One bank plus one envelope
//! - [`Preset`] - Built-in spectra (sine, triangle, sawtooth, square)
//!
//! Parameter setters stage values that fan out to all voices at the next
//! block boundary, so a control thread and the render loop never see a
//! half-applied change.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! aditivo-synth = { version = "0.1", default-features = false }
//! ```
//!
//! # Example: Rendering a Chord
//!
//! ```rust
//! use aditivo_synth::{AdditiveEngine, EngineConfig, Preset};
//!
//! let mut engine = AdditiveEngine::new(EngineConfig::default())?;
//! engine.set_preset(Preset::Square);
//!
//! engine.note_on(60, 261.63); // C4
//! engine.note_on(64, 329.63); // E4
//! engine.note_on(67, 392.00); // G4
//!
//! let mut left = vec![0.0f32; 1024];
//! let mut right = vec![0.0f32; 1024];
//! engine.process_block(&mut left, &mut right);
//! # Ok::<(), aditivo_synth::EngineError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

mod bank;
mod engine;
mod envelope;
mod preset;
mod voice;

pub use bank::{HarmonicBank, cents_to_ratio, normalization_scale};
pub use engine::{AdditiveEngine, EngineConfig, EngineError, MAX_MODULATION_CENTS, PitchId};
pub use envelope::{AdsrEnvelope, EnvelopeParams, EnvelopeState};
pub use preset::Preset;
pub use voice::Voice;
