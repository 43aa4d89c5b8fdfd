//! Built-in harmonic gain presets.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// A built-in spectrum: a rule for filling the harmonic gain vector.
///
/// Ids are stable and start at 1, matching the order presets are exposed to
/// hosts and the CLI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Fundamental only.
    Sine = 1,
    /// Odd harmonics at `1/(h+1)²`.
    Triangle = 2,
    /// All harmonics at `1/(h+1)`.
    Sawtooth = 3,
    /// Odd harmonics at `1/(h+1)`.
    Square = 4,
}

impl Preset {
    /// All presets in id order.
    pub const ALL: [Preset; 4] = [
        Preset::Sine,
        Preset::Triangle,
        Preset::Sawtooth,
        Preset::Square,
    ];

    /// Look up a preset by its stable id.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Preset::Sine),
            2 => Some(Preset::Triangle),
            3 => Some(Preset::Sawtooth),
            4 => Some(Preset::Square),
            _ => None,
        }
    }

    /// Stable id of this preset.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Sine => "sine",
            Preset::Triangle => "triangle",
            Preset::Sawtooth => "sawtooth",
            Preset::Square => "square",
        }
    }

    /// Look up a preset by name (case-sensitive, lowercase).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Build the gain vector for `harmonics` partials.
    ///
    /// Allocates; render-path callers use [`fill`](Self::fill) instead.
    pub fn gains(self, harmonics: usize) -> Vec<f32> {
        let mut gains = vec![0.0; harmonics];
        self.fill(&mut gains);
        gains
    }

    /// Write the spectrum into an existing gain buffer in place.
    ///
    /// Harmonic indices are zero-based, so harmonic `h` is the
    /// `(h + 1)`-th partial; "odd harmonics" means even indices. Does not
    /// allocate, so it is safe on the audio thread.
    pub fn fill(self, gains: &mut [f32]) {
        for (h, gain) in gains.iter_mut().enumerate() {
            let partial = (h + 1) as f32;
            *gain = match self {
                Preset::Sine => {
                    if h == 0 {
                        1.0
                    } else {
                        0.0
                    }
                }
                Preset::Triangle => {
                    if h % 2 == 0 {
                        1.0 / (partial * partial)
                    } else {
                        0.0
                    }
                }
                Preset::Sawtooth => 1.0 / partial,
                Preset::Square => {
                    if h % 2 == 0 {
                        1.0 / partial
                    } else {
                        0.0
                    }
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_id_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_id(preset.id()), Some(preset));
        }
        assert_eq!(Preset::from_id(0), None);
        assert_eq!(Preset::from_id(5), None);
    }

    #[test]
    fn test_preset_name_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(Preset::from_name("organ"), None);
    }

    #[test]
    fn test_fill_matches_gains_and_overwrites() {
        for preset in Preset::ALL {
            // Stale contents must be fully overwritten, not merged
            let mut buf = vec![0.7f32; 16];
            preset.fill(&mut buf);
            assert_eq!(buf, preset.gains(16), "{} fill/gains mismatch", preset.name());
        }
    }

    #[test]
    fn test_sine_preset_is_fundamental_only() {
        let gains = Preset::Sine.gains(16);
        assert_eq!(gains[0], 1.0);
        assert!(gains[1..].iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_sawtooth_preset_is_harmonic_reciprocal() {
        let gains = Preset::Sawtooth.gains(16);
        for (h, &gain) in gains.iter().enumerate() {
            let expected = 1.0 / (h + 1) as f32;
            assert!((gain - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_square_preset_skips_even_harmonics() {
        let gains = Preset::Square.gains(16);
        assert_eq!(gains[0], 1.0);
        assert_eq!(gains[1], 0.0);
        assert!((gains[2] - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(gains[3], 0.0);
    }

    #[test]
    fn test_triangle_preset_falls_off_quadratically() {
        let gains = Preset::Triangle.gains(16);
        assert_eq!(gains[0], 1.0);
        assert_eq!(gains[1], 0.0);
        assert!((gains[2] - 1.0 / 9.0).abs() < 1e-6);
        assert!((gains[4] - 1.0 / 25.0).abs() < 1e-6);
    }
}
