//! Polyphonic additive engine: voice pool, parameter staging, render loop.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::envelope::EnvelopeParams;
use crate::preset::Preset;
use crate::voice::Voice;

/// Identifier for a held note, used to pair note-on and note-off events.
///
/// Callers typically use MIDI note numbers, but any stable key works.
pub type PitchId = u32;

/// Maximum detune offset in cents (one octave either way).
pub const MAX_MODULATION_CENTS: f32 = 1200.0;

/// Errors from engine construction.
///
/// Construction is the only fallible point; once an engine exists, every
/// call on it completes and every rendered sample is finite.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Sample rate was zero, negative, or not finite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f32),

    /// Harmonic count was zero.
    #[error("harmonic count must be at least 1")]
    NoHarmonics,

    /// Voice count was zero.
    #[error("voice count must be at least 1")]
    NoVoices,

    /// A gain vector did not match the configured harmonic count.
    #[error("gain vector has {got} entries, engine has {expected} harmonics")]
    GainLengthMismatch {
        /// Configured harmonic count.
        expected: usize,
        /// Length of the supplied gain vector.
        got: usize,
    },
}

/// Fixed engine dimensions, validated at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Harmonics per voice.
    pub harmonics: usize,
    /// Polyphony (voice pool size).
    pub voices: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            harmonics: 16,
            voices: 6,
        }
    }
}

impl EngineConfig {
    fn validate(self) -> Result<Self, EngineError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        if self.harmonics == 0 {
            return Err(EngineError::NoHarmonics);
        }
        if self.voices == 0 {
            return Err(EngineError::NoVoices);
        }
        Ok(self)
    }
}

/// Polyphonic additive synthesizer.
///
/// Notes are assigned to a fixed pool of voices round-robin; when the pool
/// is full the oldest-assigned slot is stolen. A note-on for a pitch that
/// is already held retriggers its voice instead of consuming a new one.
///
/// Parameter setters stage their values; the staged set is fanned out to
/// every voice at the start of the next [`process_block`] call, so voices
/// never disagree about parameters within a block. Setters never allocate
/// after construction, which keeps them safe to call from an audio-thread
/// command drain.
///
/// # Example
///
/// ```rust
/// use aditivo_synth::{AdditiveEngine, EngineConfig, Preset};
///
/// let mut engine = AdditiveEngine::new(EngineConfig::default())?;
/// engine.set_preset(Preset::Sawtooth);
/// engine.note_on(69, 440.0);
///
/// let mut left = [0.0f32; 256];
/// let mut right = [0.0f32; 256];
/// engine.process_block(&mut left, &mut right);
/// # Ok::<(), aditivo_synth::EngineError>(())
/// ```
///
/// [`process_block`]: AdditiveEngine::process_block
#[derive(Debug)]
pub struct AdditiveEngine {
    config: EngineConfig,
    voices: Vec<Voice>,
    // Pitch currently held by each voice slot. None once the pitch is
    // released, even while the release tail is still sounding.
    held: Vec<Option<PitchId>>,
    cursor: usize,
    volume: f32,

    // Staged parameters, fanned out at the next block boundary.
    pending_gains: Vec<f32>,
    gains_dirty: bool,
    pending_envelope: EnvelopeParams,
    envelope_dirty: bool,
    pending_modulation: f32,
    modulation_dirty: bool,
}

impl AdditiveEngine {
    /// Create an engine, failing fast on invalid dimensions.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let config = config.validate()?;
        let voices = (0..config.voices)
            .map(|_| Voice::new(config.harmonics, config.sample_rate))
            .collect();
        let mut pending_gains = vec![0.0; config.harmonics];
        pending_gains[0] = 1.0;
        Ok(Self {
            config,
            voices,
            held: vec![None; config.voices],
            cursor: 0,
            volume: 1.0,
            pending_gains,
            gains_dirty: false,
            pending_envelope: EnvelopeParams::default(),
            envelope_dirty: false,
            pending_modulation: 0.0,
            modulation_dirty: false,
        })
    }

    /// Engine dimensions.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Number of voices whose envelopes are currently sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Fundamental frequency of voice `index`, if the index is in range.
    pub fn voice_fundamental(&self, index: usize) -> Option<f32> {
        self.voices.get(index).map(Voice::fundamental)
    }

    /// Start a note.
    ///
    /// If `pitch` is already held, its voice is retriggered at `freq_hz`
    /// instead of claiming a new slot. Otherwise the voice at the
    /// round-robin cursor is taken, stealing whatever it was playing.
    pub fn note_on(&mut self, pitch: PitchId, freq_hz: f32) {
        if let Some(slot) = self.held.iter().position(|&p| p == Some(pitch)) {
            self.voices[slot].note_on(freq_hz);
            return;
        }
        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.voices.len();
        self.held[slot] = Some(pitch);
        self.voices[slot].note_on(freq_hz);
    }

    /// Release a note. Every voice holding `pitch` enters its release
    /// phase; an unknown pitch is ignored.
    pub fn note_off(&mut self, pitch: PitchId) {
        for (slot, held) in self.held.iter_mut().enumerate() {
            if *held == Some(pitch) {
                self.voices[slot].note_off();
                *held = None;
            }
        }
    }

    /// Release all held notes.
    pub fn all_notes_off(&mut self) {
        for (slot, held) in self.held.iter_mut().enumerate() {
            if held.take().is_some() {
                self.voices[slot].note_off();
            }
        }
    }

    /// Stage a new harmonic gain vector, clamping each entry to `[0, 1]`.
    ///
    /// Takes effect at the next block boundary. Fails if the vector length
    /// does not match the configured harmonic count.
    pub fn set_harmonic_gains(&mut self, gains: &[f32]) -> Result<(), EngineError> {
        if gains.len() != self.config.harmonics {
            return Err(EngineError::GainLengthMismatch {
                expected: self.config.harmonics,
                got: gains.len(),
            });
        }
        for (dst, &src) in self.pending_gains.iter_mut().zip(gains) {
            *dst = src.clamp(0.0, 1.0);
        }
        self.gains_dirty = true;
        Ok(())
    }

    /// Stage a built-in preset's gain vector.
    ///
    /// Writes into the staged buffer in place; like the other setters this
    /// does not allocate, so it is safe inside an audio-thread command
    /// drain.
    pub fn set_preset(&mut self, preset: Preset) {
        preset.fill(&mut self.pending_gains);
        self.gains_dirty = true;
    }

    /// Stage new envelope timing parameters.
    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.pending_envelope = params;
        self.envelope_dirty = true;
    }

    /// Set the overall output volume, clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Current output volume.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Stage a global detune offset, clamped to ±1200 cents.
    pub fn set_modulation_cents(&mut self, cents: f32) {
        self.pending_modulation = cents.clamp(-MAX_MODULATION_CENTS, MAX_MODULATION_CENTS);
        self.modulation_dirty = true;
    }

    /// Render one audio block into a stereo pair of equal-length buffers.
    ///
    /// Staged parameters are applied first, then each sample is the sum of
    /// all active voices, scaled by `volume / pool size` and hard-clamped
    /// to `[-1, 1]`. The mono mix is written to both channels.
    ///
    /// # Panics
    ///
    /// Panics if `left` and `right` differ in length.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        assert_eq!(left.len(), right.len(), "stereo buffers must match");

        self.apply_pending();

        let scale = self.volume / self.voices.len() as f32;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mut mix = 0.0;
            for voice in &mut self.voices {
                mix += voice.next_sample();
            }
            let sample = (mix * scale).clamp(-1.0, 1.0);
            *l = sample;
            *r = sample;
        }
    }

    /// Render a single mono sample.
    ///
    /// Convenience entry point for tests and benches; real-time callers
    /// use [`process_block`](Self::process_block). Staged parameters are
    /// applied before the sample, so each call is its own tiny block.
    pub fn process(&mut self) -> f32 {
        self.apply_pending();
        let scale = self.volume / self.voices.len() as f32;
        let mut mix = 0.0;
        for voice in &mut self.voices {
            mix += voice.next_sample();
        }
        (mix * scale).clamp(-1.0, 1.0)
    }

    fn apply_pending(&mut self) {
        if self.gains_dirty {
            for voice in &mut self.voices {
                voice.set_gains(&self.pending_gains);
            }
            self.gains_dirty = false;
        }
        if self.envelope_dirty {
            for voice in &mut self.voices {
                voice.set_envelope(self.pending_envelope);
            }
            self.envelope_dirty = false;
        }
        if self.modulation_dirty {
            for voice in &mut self.voices {
                voice.set_modulation_cents(self.pending_modulation);
            }
            self.modulation_dirty = false;
        }
    }
}
