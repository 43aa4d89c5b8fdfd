//! Harmonic sine oscillator bank.
//!
//! Each voice owns one bank: a set of phase accumulators, one per harmonic,
//! all driven from a single fundamental frequency. Harmonic `h` (zero-based)
//! runs at `(h + 1)` times the fundamental, optionally detuned by a global
//! modulation offset in cents.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f32::consts::TAU;

use libm::{powf, sinf};

/// Convert a detune offset in cents to a frequency ratio.
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    powf(2.0, cents / 1200.0)
}

/// Normalization scale for a set of active harmonic gains.
///
/// Returns `1 / sum` so that summed harmonics stay within unit amplitude.
/// An all-zero (or fully gated) gain set yields 0.0 instead of dividing
/// by zero, which silences the voice.
#[inline]
pub fn normalization_scale(gain_sum: f32) -> f32 {
    if gain_sum > 0.0 { 1.0 / gain_sum } else { 0.0 }
}

/// Wrap a phase value into `[0, 2π)`.
///
/// Handles arbitrarily large inputs, not just single-cycle overshoot, so
/// increments above 2π (possible for high harmonics at low sample rates)
/// still produce a valid phase.
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase % TAU;
    if wrapped < 0.0 { wrapped + TAU } else { wrapped }
}

/// Bank of phase-accumulating sine oscillators at integer multiples of a
/// fundamental frequency.
///
/// Phase state persists across notes; retriggering a pitch does not reset
/// phases, so repeated notes continue the waveform without a discontinuity.
///
/// # Example
///
/// ```rust
/// use aditivo_synth::HarmonicBank;
///
/// let mut bank = HarmonicBank::new(16, 48000.0);
/// bank.set_fundamental(440.0);
///
/// let gains = [1.0, 0.5, 0.25, 0.0, 0.0, 0.0, 0.0, 0.0,
///              0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
/// let sample = bank.next_sample(&gains);
/// ```
#[derive(Debug, Clone)]
pub struct HarmonicBank {
    phases: Vec<f32>,
    increments: Vec<f32>,
    sample_rate: f32,
    nyquist: f32,
    fundamental: f32,
    modulation_cents: f32,
}

impl HarmonicBank {
    /// Create a bank with `harmonics` oscillators, all silent at 0 Hz.
    pub fn new(harmonics: usize, sample_rate: f32) -> Self {
        Self {
            phases: vec![0.0; harmonics],
            increments: vec![0.0; harmonics],
            sample_rate,
            nyquist: sample_rate / 2.0,
            fundamental: 0.0,
            modulation_cents: 0.0,
        }
    }

    /// Number of harmonics in the bank.
    pub fn harmonics(&self) -> usize {
        self.phases.len()
    }

    /// Current fundamental frequency in Hz.
    pub fn fundamental(&self) -> f32 {
        self.fundamental
    }

    /// Set the sample rate and recompute all phase increments.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.nyquist = sample_rate / 2.0;
        self.recompute_increments();
    }

    /// Set the fundamental frequency in Hz.
    pub fn set_fundamental(&mut self, freq: f32) {
        self.fundamental = freq;
        self.recompute_increments();
    }

    /// Set the global detune offset in cents and recompute increments.
    pub fn set_modulation_cents(&mut self, cents: f32) {
        self.modulation_cents = cents;
        self.recompute_increments();
    }

    /// Whether harmonic `h` (zero-based) is below the Nyquist limit at the
    /// current fundamental.
    #[inline]
    pub fn is_audible(&self, h: usize) -> bool {
        self.fundamental * (h as f32 + 1.0) < self.nyquist
    }

    /// Sum of `gains` over harmonics that pass the Nyquist gate.
    ///
    /// This is the denominator for [`normalization_scale`]; gated harmonics
    /// contribute nothing, matching their exclusion from the mix.
    pub fn audible_gain_sum(&self, gains: &[f32]) -> f32 {
        let mut sum = 0.0;
        for (h, &gain) in gains.iter().enumerate().take(self.phases.len()) {
            if self.is_audible(h) {
                sum += gain;
            }
        }
        sum
    }

    /// Generate one sample: the gain-weighted sum of all audible harmonics,
    /// advancing every phase accumulator (including gated ones).
    #[inline]
    pub fn next_sample(&mut self, gains: &[f32]) -> f32 {
        let mut sum = 0.0;
        for (h, (phase, &inc)) in self
            .phases
            .iter_mut()
            .zip(self.increments.iter())
            .enumerate()
        {
            let gain = gains.get(h).copied().unwrap_or(0.0);
            // Gated harmonics keep accumulating phase so re-enabling them
            // stays continuous with the rest of the bank.
            if gain > 0.0 && self.fundamental * (h as f32 + 1.0) < self.nyquist {
                sum += gain * sinf(*phase);
            }
            *phase += inc;
            if *phase >= TAU {
                *phase -= TAU;
            }
        }
        sum
    }

    fn recompute_increments(&mut self) {
        let ratio = cents_to_ratio(self.modulation_cents);
        let base = TAU * self.fundamental * ratio / self.sample_rate;
        for (h, inc) in self.increments.iter_mut().enumerate() {
            // Keep per-sample increments within one cycle so the single
            // subtraction in next_sample is enough to wrap the phase.
            *inc = wrap_phase(base * (h as f32 + 1.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_to_ratio() {
        assert!((cents_to_ratio(0.0) - 1.0).abs() < 1e-6);
        assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-5);
        assert!((cents_to_ratio(-1200.0) - 0.5).abs() < 1e-5);
        // 100 cents = one semitone
        assert!((cents_to_ratio(100.0) - 1.059_463).abs() < 1e-4);
    }

    #[test]
    fn test_normalization_scale() {
        assert_eq!(normalization_scale(2.0), 0.5);
        assert_eq!(normalization_scale(1.0), 1.0);
        // Zero sum must not divide by zero
        assert_eq!(normalization_scale(0.0), 0.0);
        assert_eq!(normalization_scale(-1.0), 0.0);
    }

    #[test]
    fn test_bank_single_harmonic_is_sine() {
        let sample_rate = 44100.0;
        let mut bank = HarmonicBank::new(16, sample_rate);
        bank.set_fundamental(440.0);

        let mut gains = [0.0f32; 16];
        gains[0] = 1.0;

        let inc = TAU * 440.0 / sample_rate;
        for n in 0..1024 {
            let sample = bank.next_sample(&gains);
            let expected = sinf(inc * n as f32);
            assert!(
                (sample - expected).abs() < 1e-3,
                "sample {} deviates: {} vs {}",
                n,
                sample,
                expected
            );
        }
    }

    #[test]
    fn test_bank_phase_continuity_across_frequency_change() {
        let mut bank = HarmonicBank::new(4, 48000.0);
        bank.set_fundamental(220.0);

        let gains = [1.0, 0.0, 0.0, 0.0];
        for _ in 0..100 {
            bank.next_sample(&gains);
        }
        let before = bank.next_sample(&gains);

        // A frequency change must not jump the phase
        bank.set_fundamental(221.0);
        let after = bank.next_sample(&gains);
        assert!(
            (after - before).abs() < 0.05,
            "discontinuity across frequency change: {} -> {}",
            before,
            after
        );
    }

    #[test]
    fn test_bank_nyquist_gate() {
        let sample_rate = 48000.0;
        let mut bank = HarmonicBank::new(16, sample_rate);
        // Harmonic 2 (zero-based index 1) sits at 20 kHz, harmonic 3 at 30 kHz
        bank.set_fundamental(10_000.0);

        assert!(bank.is_audible(0));
        assert!(bank.is_audible(1));
        assert!(!bank.is_audible(2));
        assert!(!bank.is_audible(15));

        // With only gated harmonics enabled the output is silence
        let mut gains = [0.0f32; 16];
        gains[2] = 1.0;
        gains[5] = 1.0;
        for _ in 0..256 {
            assert_eq!(bank.next_sample(&gains), 0.0);
        }
    }

    #[test]
    fn test_bank_audible_gain_sum_excludes_gated() {
        let mut bank = HarmonicBank::new(16, 48000.0);
        bank.set_fundamental(10_000.0);

        let mut gains = [0.0f32; 16];
        gains[0] = 1.0; // 10 kHz, audible
        gains[1] = 0.5; // 20 kHz, audible
        gains[2] = 1.0; // 30 kHz, gated
        assert!((bank.audible_gain_sum(&gains) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bank_phases_stay_in_range() {
        let mut bank = HarmonicBank::new(16, 8000.0);
        // High fundamental at a low rate pushes upper increments past 2π
        bank.set_fundamental(1500.0);

        let gains = [1.0f32; 16];
        for _ in 0..4096 {
            bank.next_sample(&gains);
            for &phase in &bank.phases {
                assert!(
                    (0.0..TAU).contains(&phase),
                    "phase out of range: {}",
                    phase
                );
            }
        }
    }

    #[test]
    fn test_bank_output_bounded_by_gain_sum() {
        let mut bank = HarmonicBank::new(16, 48000.0);
        bank.set_fundamental(110.0);

        let gains = [0.25f32; 16];
        let bound: f32 = gains.iter().sum();
        for _ in 0..8192 {
            let sample = bank.next_sample(&gains);
            assert!(sample.abs() <= bound + 1e-4);
        }
    }

    #[test]
    fn test_bank_modulation_shifts_pitch() {
        let sample_rate = 48000.0;
        let mut bank = HarmonicBank::new(1, sample_rate);
        bank.set_fundamental(440.0);
        bank.set_modulation_cents(1200.0);

        // One octave up: period halves
        let gains = [1.0f32];
        let inc = TAU * 880.0 / sample_rate;
        for n in 0..512 {
            let sample = bank.next_sample(&gains);
            let expected = sinf(inc * n as f32);
            assert!((sample - expected).abs() < 1e-3);
        }
    }
}
