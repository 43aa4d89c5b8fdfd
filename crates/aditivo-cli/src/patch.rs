//! Patch file format for the synthesizer.
//!
//! Patches are stored as TOML files describing a spectrum (a preset name or
//! an explicit gain list), envelope times, and the global knobs. Both the
//! render and play commands accept one via `--patch`.

use aditivo_synth::{AdditiveEngine, EnvelopeParams, Preset};
use serde::Deserialize;

/// Patch file format.
#[derive(Debug, Deserialize)]
pub struct Patch {
    /// Name of the patch
    pub name: String,
    /// Optional description
    #[serde(default)]
    #[allow(dead_code)]
    pub description: Option<String>,
    /// Built-in preset name (sine, triangle, sawtooth, square)
    #[serde(default)]
    pub preset: Option<String>,
    /// Explicit harmonic gains, overriding `preset` if both are given
    #[serde(default)]
    pub harmonics: Option<Vec<f32>>,
    /// Envelope times
    #[serde(default)]
    pub envelope: Option<EnvelopeConfig>,
    /// Overall volume (0-1)
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Global detune in cents
    #[serde(default)]
    pub modulation_cents: f32,
}

fn default_volume() -> f32 {
    1.0
}

/// Envelope section of a patch file.
#[derive(Debug, Deserialize)]
pub struct EnvelopeConfig {
    /// Attack time in seconds
    #[serde(default)]
    pub attack: f32,
    /// Decay time in seconds
    #[serde(default)]
    pub decay: f32,
    /// Sustain level (0-1)
    #[serde(default = "default_sustain")]
    pub sustain: f32,
    /// Release time in seconds
    #[serde(default)]
    pub release: f32,
}

fn default_sustain() -> f32 {
    1.0
}

impl Patch {
    /// Load a patch from a TOML file.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let patch: Patch = toml::from_str(&content)?;
        Ok(patch)
    }

    /// Apply every field of the patch to an engine.
    ///
    /// Explicit `harmonics` win over `preset` when both are present. The
    /// gain list must match the engine's harmonic count.
    pub fn apply_to(&self, engine: &mut AdditiveEngine) -> anyhow::Result<()> {
        if let Some(gains) = &self.harmonics {
            engine.set_harmonic_gains(gains)?;
        } else if let Some(name) = &self.preset {
            let preset = Preset::from_name(name)
                .ok_or_else(|| anyhow::anyhow!("unknown preset '{}' in patch", name))?;
            engine.set_preset(preset);
        }

        if let Some(env) = &self.envelope {
            engine.set_envelope(EnvelopeParams::new(
                env.attack,
                env.decay,
                env.sustain,
                env.release,
            ));
        }

        engine.set_volume(self.volume);
        engine.set_modulation_cents(self.modulation_cents);
        Ok(())
    }
}
