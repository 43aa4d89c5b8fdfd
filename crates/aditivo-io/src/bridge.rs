//! Lock-free control-to-audio communication.
//!
//! The engine lives inside the audio callback; control code (CLI key
//! handling, MIDI, tests) talks to it through a [`SynthController`]. Note
//! and spectrum events travel over a crossbeam channel, drained at the
//! start of each audio block; the two continuous knobs (volume, detune)
//! are bit-cast atomics read every block.

use aditivo_synth::{AdditiveEngine, EnvelopeParams, PitchId, Preset};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

/// A thread-safe atomic parameter using bit-cast f32.
///
/// Control thread writes, audio thread reads. No locks, no allocations.
#[derive(Debug)]
pub struct AtomicParam {
    value: AtomicU32,
    min: f32,
    max: f32,
    default: f32,
}

impl AtomicParam {
    /// Create a new atomic parameter with range and default.
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            value: AtomicU32::new(default.to_bits()),
            min,
            max,
            default,
        }
    }

    /// Set the parameter value (control thread).
    #[inline]
    pub fn set(&self, v: f32) {
        let clamped = v.clamp(self.min, self.max);
        self.value.store(clamped.to_bits(), Ordering::Release);
    }

    /// Get the parameter value (audio thread).
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Acquire))
    }

    /// Get the minimum value.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Get the maximum value.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Reset to the default value.
    pub fn reset(&self) {
        self.set(self.default);
    }
}

/// Discrete events sent from the control thread to the audio thread.
#[derive(Debug, Clone)]
pub enum SynthCommand {
    /// Start a note at the given frequency.
    NoteOn {
        /// Stable note identifier, typically a MIDI note number.
        pitch: PitchId,
        /// Fundamental frequency in Hz.
        freq_hz: f32,
    },
    /// Release a note.
    NoteOff {
        /// Identifier used in the matching [`SynthCommand::NoteOn`].
        pitch: PitchId,
    },
    /// Release every held note.
    AllNotesOff,
    /// Replace the harmonic gain vector.
    SetGains(Vec<f32>),
    /// Replace the envelope timing parameters.
    SetEnvelope(EnvelopeParams),
    /// Apply a built-in preset's spectrum.
    SetPreset(Preset),
}

/// Bridge between a control thread and an engine owned by the audio
/// callback.
///
/// Cheap to clone behind an [`Arc`]; the audio thread calls
/// [`apply_to`](SynthController::apply_to) once per block, everything else
/// is for control threads.
#[derive(Debug)]
pub struct SynthController {
    volume: Arc<AtomicParam>,
    modulation_cents: Arc<AtomicParam>,
    command_tx: Sender<SynthCommand>,
    command_rx: Receiver<SynthCommand>,
}

impl Default for SynthController {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthController {
    /// Create a new controller with full volume and no detune.
    pub fn new() -> Self {
        let (command_tx, command_rx) = unbounded();
        Self {
            volume: Arc::new(AtomicParam::new(1.0, 0.0, 1.0)),
            modulation_cents: Arc::new(AtomicParam::new(0.0, -1200.0, 1200.0)),
            command_tx,
            command_rx,
        }
    }

    /// Get the volume control.
    pub fn volume(&self) -> Arc<AtomicParam> {
        Arc::clone(&self.volume)
    }

    /// Get the detune control (cents).
    pub fn modulation_cents(&self) -> Arc<AtomicParam> {
        Arc::clone(&self.modulation_cents)
    }

    /// Queue a command for the audio thread (non-blocking).
    pub fn send(&self, cmd: SynthCommand) {
        let _ = self.command_tx.send(cmd);
    }

    /// Start a note.
    pub fn note_on(&self, pitch: PitchId, freq_hz: f32) {
        self.send(SynthCommand::NoteOn { pitch, freq_hz });
    }

    /// Release a note.
    pub fn note_off(&self, pitch: PitchId) {
        self.send(SynthCommand::NoteOff { pitch });
    }

    /// Drain queued commands and atomics into the engine.
    ///
    /// Called from the audio thread at the start of each block, before
    /// `process_block`, so every change lands on a block boundary.
    pub fn apply_to(&self, engine: &mut AdditiveEngine) {
        while let Ok(cmd) = self.command_rx.try_recv() {
            match cmd {
                SynthCommand::NoteOn { pitch, freq_hz } => engine.note_on(pitch, freq_hz),
                SynthCommand::NoteOff { pitch } => engine.note_off(pitch),
                SynthCommand::AllNotesOff => engine.all_notes_off(),
                SynthCommand::SetGains(gains) => {
                    if let Err(e) = engine.set_harmonic_gains(&gains) {
                        debug!("dropped gain update: {}", e);
                    }
                }
                SynthCommand::SetEnvelope(params) => engine.set_envelope(params),
                SynthCommand::SetPreset(preset) => engine.set_preset(preset),
            }
        }

        engine.set_volume(self.volume.get());
        engine.set_modulation_cents(self.modulation_cents.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aditivo_synth::EngineConfig;

    #[test]
    fn test_atomic_param_clamps() {
        let param = AtomicParam::new(0.5, 0.0, 1.0);
        param.set(2.0);
        assert_eq!(param.get(), 1.0);
        param.set(-1.0);
        assert_eq!(param.get(), 0.0);
        param.reset();
        assert_eq!(param.get(), 0.5);
    }

    #[test]
    fn test_commands_reach_engine_at_block_boundary() {
        let controller = SynthController::new();
        let mut engine = AdditiveEngine::new(EngineConfig::default()).unwrap();

        controller.send(SynthCommand::SetEnvelope(EnvelopeParams::new(
            0.0, 0.0, 1.0, 0.0,
        )));
        controller.note_on(69, 440.0);

        // Nothing lands until the audio side drains
        assert_eq!(engine.active_voices(), 0);

        controller.apply_to(&mut engine);
        assert_eq!(engine.active_voices(), 1);
        assert_eq!(engine.voice_fundamental(0), Some(440.0));

        controller.note_off(69);
        controller.apply_to(&mut engine);
        let mut left = [0.0f32; 16];
        let mut right = [0.0f32; 16];
        engine.process_block(&mut left, &mut right);
        assert_eq!(engine.active_voices(), 0);
    }

    #[test]
    fn test_volume_knob_propagates() {
        let controller = SynthController::new();
        let mut engine = AdditiveEngine::new(EngineConfig::default()).unwrap();

        controller.volume().set(0.25);
        controller.apply_to(&mut engine);
        assert_eq!(engine.volume(), 0.25);
    }

    #[test]
    fn test_bad_gain_vector_is_dropped_not_fatal() {
        let controller = SynthController::new();
        let mut engine = AdditiveEngine::new(EngineConfig::default()).unwrap();

        controller.send(SynthCommand::SetGains(vec![1.0; 3]));
        controller.apply_to(&mut engine);

        // Engine still renders after the rejected update
        let mut left = [0.0f32; 16];
        let mut right = [0.0f32; 16];
        engine.process_block(&mut left, &mut right);
    }

    #[test]
    fn test_controller_works_across_threads() {
        let controller = Arc::new(SynthController::new());
        let mut engine = AdditiveEngine::new(EngineConfig::default()).unwrap();

        let sender = Arc::clone(&controller);
        let handle = std::thread::spawn(move || {
            sender.note_on(60, 261.63);
            sender.volume().set(0.5);
        });
        handle.join().unwrap();

        controller.apply_to(&mut engine);
        assert_eq!(engine.active_voices(), 1);
        assert_eq!(engine.volume(), 0.5);
    }
}
