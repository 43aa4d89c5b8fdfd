//! ADSR envelope generator for additive voices.
//!
//! Provides attack-decay-sustain-release envelopes with exponential
//! one-pole segments. Segment times are given in seconds; a time shorter
//! than one sample snaps instantly, so `(0, 0, 1, 0)` behaves as a gate.

use libm::expf;

/// Level below which a releasing envelope is considered silent.
const SILENCE_FLOOR: f32 = 1e-4;

/// Attack curves toward this target so the exponential actually reaches 1.0
/// instead of approaching it asymptotically.
const ATTACK_TARGET: f32 = 1.2;

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive — output is zero.
    #[default]
    Idle,
    /// Attack phase — output ramps up toward peak level.
    Attack,
    /// Decay phase — output falls from peak toward sustain level.
    Decay,
    /// Sustain phase — output holds at sustain level while gate is held.
    Sustain,
    /// Release phase — output decays to zero after gate release.
    Release,
}

/// Envelope timing parameters.
///
/// Times are in seconds. Negative times and out-of-range sustain levels are
/// clamped at construction rather than rejected — the render path must
/// always have something valid to work with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeParams {
    /// Attack time in seconds.
    pub attack_secs: f32,
    /// Decay time in seconds.
    pub decay_secs: f32,
    /// Sustain level (0.0 to 1.0).
    pub sustain: f32,
    /// Release time in seconds.
    pub release_secs: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack_secs: 0.5,
            decay_secs: 0.5,
            sustain: 1.0,
            release_secs: 0.5,
        }
    }
}

impl EnvelopeParams {
    /// Create envelope parameters, clamping each field into its valid range.
    pub fn new(attack_secs: f32, decay_secs: f32, sustain: f32, release_secs: f32) -> Self {
        Self {
            attack_secs: attack_secs.max(0.0),
            decay_secs: decay_secs.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release_secs: release_secs.max(0.0),
        }
    }
}

/// ADSR envelope generator.
///
/// Produces a per-sample amplitude multiplier in `[0, 1]`. Retriggering
/// (`gate_on` while already sounding) restarts the attack from the current
/// level rather than from zero, which avoids a click on repeated notes.
///
/// # Example
///
/// ```rust
/// use aditivo_synth::{AdsrEnvelope, EnvelopeParams};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_params(EnvelopeParams::new(0.01, 0.1, 0.7, 0.2));
///
/// env.gate_on();
/// for _ in 0..1000 {
///     let level = env.advance();
/// }
/// env.gate_off();
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,
    params: EnvelopeParams,

    // Coefficients (pre-calculated)
    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create a new ADSR envelope with default parameters
    /// (0.5 s attack/decay/release, full sustain).
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            params: EnvelopeParams::default(),
            attack_coeff: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
        };
        env.recalculate_coefficients();
        env
    }

    /// Set all four timing parameters at once.
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = EnvelopeParams::new(
            params.attack_secs,
            params.decay_secs,
            params.sustain,
            params.release_secs,
        );
        self.recalculate_coefficients();
    }

    /// Get the current parameters.
    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    /// Set sample rate and recompute segment coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Trigger the envelope (note on).
    pub fn gate_on(&mut self) {
        self.state = EnvelopeState::Attack;
        // Don't reset level, so retriggering is click-free
    }

    /// Release the envelope (note off).
    pub fn gate_off(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
        }
    }

    /// Force envelope to idle state.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Get current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Get current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Check if envelope is active (not idle).
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance envelope by one sample and return the current level.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level = ATTACK_TARGET + (self.level - ATTACK_TARGET) * self.attack_coeff;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let sustain = self.params.sustain;
                self.level = sustain + (self.level - sustain) * self.decay_coeff;

                if (self.level - sustain).abs() < SILENCE_FLOOR {
                    self.level = sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeState::Release => {
                self.level *= self.release_coeff;

                if self.level < SILENCE_FLOOR {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }

        self.level
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = segment_coeff(self.params.attack_secs, self.sample_rate);
        self.decay_coeff = segment_coeff(self.params.decay_secs, self.sample_rate);
        self.release_coeff = segment_coeff(self.params.release_secs, self.sample_rate);
    }
}

/// One-pole coefficient for an exponential segment lasting `secs` seconds.
///
/// Segments shorter than one sample get a coefficient of 0.0, which makes
/// the segment complete in a single `advance` call.
fn segment_coeff(secs: f32, sample_rate: f32) -> f32 {
    let samples = secs * sample_rate;
    if samples < 1.0 {
        0.0
    } else {
        expf(-1.0 / samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_idle_state() {
        let mut env = AdsrEnvelope::new(48000.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.level(), 0.0);

        // Advancing in idle should stay at 0
        for _ in 0..100 {
            assert_eq!(env.advance(), 0.0);
        }
    }

    #[test]
    fn test_envelope_attack_is_monotonic() {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_params(EnvelopeParams::new(0.05, 0.1, 0.7, 0.2));

        env.gate_on();
        let mut prev = 0.0;
        while env.state() == EnvelopeState::Attack {
            let level = env.advance();
            assert!(
                level >= prev,
                "attack must be non-decreasing: {} after {}",
                level,
                prev
            );
            prev = level;
        }
        assert_eq!(env.state(), EnvelopeState::Decay);
        assert_eq!(env.level(), 1.0);
    }

    #[test]
    fn test_envelope_decay_to_sustain() {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_params(EnvelopeParams::new(0.001, 0.01, 0.5, 0.2));

        env.gate_on();
        for _ in 0..5000 {
            env.advance();
        }

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!(
            (env.level() - 0.5).abs() < 0.01,
            "expected sustain level 0.5, got {}",
            env.level()
        );
    }

    #[test]
    fn test_envelope_release_is_monotonic() {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_params(EnvelopeParams::new(0.001, 0.001, 0.7, 0.05));

        env.gate_on();
        for _ in 0..2000 {
            env.advance();
        }

        env.gate_off();
        assert_eq!(env.state(), EnvelopeState::Release);

        let mut prev = env.level();
        for _ in 0..30000 {
            let level = env.advance();
            assert!(
                level <= prev,
                "release must be non-increasing: {} after {}",
                level,
                prev
            );
            prev = level;
        }

        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn test_envelope_becomes_inactive_at_silence() {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_params(EnvelopeParams::new(0.0, 0.0, 1.0, 0.01));

        env.gate_on();
        env.advance();
        env.gate_off();

        // is_active must flip exactly when the level hits (near) zero
        loop {
            let level = env.advance();
            if !env.is_active() {
                assert!(level < SILENCE_FLOOR, "went idle at level {}", level);
                break;
            }
            assert!(level > 0.0);
        }
    }

    #[test]
    fn test_envelope_instant_gate() {
        // (0, 0, 1, 0): full level on the first sample, silent on note-off
        let mut env = AdsrEnvelope::new(44100.0);
        env.set_params(EnvelopeParams::new(0.0, 0.0, 1.0, 0.0));

        env.gate_on();
        assert_eq!(env.advance(), 1.0);
        assert_eq!(env.advance(), 1.0);

        env.gate_off();
        assert_eq!(env.advance(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn test_envelope_retrigger_keeps_level() {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_params(EnvelopeParams::new(0.05, 0.1, 0.7, 0.2));

        env.gate_on();
        for _ in 0..200 {
            env.advance();
        }
        let level_before = env.level();

        // Retrigger while still in attack
        env.gate_on();
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!(
            (env.level() - level_before).abs() < 0.001,
            "retrigger should preserve level"
        );
    }

    #[test]
    fn test_envelope_output_range() {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_params(EnvelopeParams::new(0.005, 0.02, 0.6, 0.05));

        env.gate_on();
        for _ in 0..5000 {
            let level = env.advance();
            assert!(
                (0.0..=1.0).contains(&level),
                "level out of range: {}",
                level
            );
        }

        env.gate_off();
        for _ in 0..10000 {
            let level = env.advance();
            assert!(
                (0.0..=1.0).contains(&level),
                "level out of range during release: {}",
                level
            );
        }
    }

    #[test]
    fn test_envelope_params_clamped() {
        let params = EnvelopeParams::new(-1.0, -0.5, 1.5, -2.0);
        assert_eq!(params.attack_secs, 0.0);
        assert_eq!(params.decay_secs, 0.0);
        assert_eq!(params.sustain, 1.0);
        assert_eq!(params.release_secs, 0.0);
    }

    #[test]
    fn test_envelope_state_transitions() {
        let mut env = AdsrEnvelope::new(48000.0);
        env.set_params(EnvelopeParams::new(0.001, 0.005, 0.5, 0.01));

        assert_eq!(env.state(), EnvelopeState::Idle);

        env.gate_on();
        assert_eq!(env.state(), EnvelopeState::Attack);

        for _ in 0..1000 {
            env.advance();
            if env.state() == EnvelopeState::Decay {
                break;
            }
        }
        assert_eq!(env.state(), EnvelopeState::Decay);

        for _ in 0..5000 {
            env.advance();
            if env.state() == EnvelopeState::Sustain {
                break;
            }
        }
        assert_eq!(env.state(), EnvelopeState::Sustain);

        env.gate_off();
        assert_eq!(env.state(), EnvelopeState::Release);

        for _ in 0..20000 {
            env.advance();
            if env.state() == EnvelopeState::Idle {
                break;
            }
        }
        assert_eq!(env.state(), EnvelopeState::Idle);
    }
}
