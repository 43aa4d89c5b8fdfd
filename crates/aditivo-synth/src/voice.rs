//! A single synthesizer voice: one harmonic bank shaped by one envelope.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::bank::{HarmonicBank, normalization_scale};
use crate::envelope::{AdsrEnvelope, EnvelopeParams};

/// One voice of the additive engine.
///
/// A voice is silent until [`note_on`](Voice::note_on) is called, then
/// renders until its envelope finishes releasing. The harmonic gain set and
/// its normalization scale are cached per voice so the sample loop touches
/// no shared state.
#[derive(Debug, Clone)]
pub struct Voice {
    bank: HarmonicBank,
    envelope: AdsrEnvelope,
    gains: Vec<f32>,
    norm_scale: f32,
}

impl Voice {
    /// Create a silent voice with `harmonics` oscillators.
    ///
    /// The initial gain set is fundamental-only (gain 1.0 on harmonic 1,
    /// zero elsewhere), so an unconfigured voice plays a pure sine.
    pub fn new(harmonics: usize, sample_rate: f32) -> Self {
        let mut gains = vec![0.0; harmonics];
        if let Some(first) = gains.first_mut() {
            *first = 1.0;
        }
        let mut voice = Self {
            bank: HarmonicBank::new(harmonics, sample_rate),
            envelope: AdsrEnvelope::new(sample_rate),
            gains,
            norm_scale: 0.0,
        };
        voice.refresh_norm_scale();
        voice
    }

    /// Start (or retrigger) the voice at `freq` Hz.
    ///
    /// Oscillator phases are left running; only the frequency and the
    /// envelope gate change.
    pub fn note_on(&mut self, freq: f32) {
        self.bank.set_fundamental(freq);
        self.refresh_norm_scale();
        self.envelope.gate_on();
    }

    /// Release the voice. It keeps sounding through the envelope tail.
    pub fn note_off(&mut self) {
        self.envelope.gate_off();
    }

    /// Whether the voice is producing sound (envelope not idle).
    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    /// Current fundamental frequency in Hz.
    pub fn fundamental(&self) -> f32 {
        self.bank.fundamental()
    }

    /// Replace the harmonic gain set.
    ///
    /// `gains` must match the voice's harmonic count; the engine validates
    /// this before fan-out, so the slice copy here cannot be ragged.
    pub fn set_gains(&mut self, gains: &[f32]) {
        debug_assert_eq!(gains.len(), self.gains.len());
        self.gains.copy_from_slice(gains);
        self.refresh_norm_scale();
    }

    /// Set the envelope timing parameters.
    pub fn set_envelope(&mut self, params: EnvelopeParams) {
        self.envelope.set_params(params);
    }

    /// Set the global detune offset in cents.
    pub fn set_modulation_cents(&mut self, cents: f32) {
        self.bank.set_modulation_cents(cents);
    }

    /// Set the sample rate for bank and envelope.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.bank.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
        self.refresh_norm_scale();
    }

    /// Render one mono sample.
    ///
    /// Returns 0.0 when inactive; the caller may still invoke this
    /// unconditionally and sum over the pool.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if !self.envelope.is_active() {
            return 0.0;
        }
        let raw = self.bank.next_sample(&self.gains);
        raw * self.norm_scale * self.envelope.advance()
    }

    // The Nyquist gate depends on the fundamental, so the normalization
    // denominator must be recomputed on every frequency or gain change.
    fn refresh_norm_scale(&mut self) {
        self.norm_scale = normalization_scale(self.bank.audible_gain_sum(&self.gains));
    }
}
