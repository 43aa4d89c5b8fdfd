//! Audio I/O layer for the aditivo additive synthesizer.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`write_wav`] and [`write_wav_stereo`] for rendering
//!   to disk, [`read_wav`] for loading renders back
//! - **Real-time playback**: [`AudioStream`] for live audio output via cpal
//! - **Thread bridging**: [`SynthController`] for feeding note and parameter
//!   events into an engine owned by the audio callback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use aditivo_io::{WavSpec, write_wav};
//! use aditivo_synth::{AdditiveEngine, EngineConfig};
//!
//! let mut engine = AdditiveEngine::new(EngineConfig::default())?;
//! engine.note_on(69, 440.0);
//!
//! let mut left = vec![0.0f32; 48000];
//! let mut right = vec![0.0f32; 48000];
//! engine.process_block(&mut left, &mut right);
//!
//! write_wav("tone.wav", &left, WavSpec::default())?;
//! ```

mod bridge;
mod stream;
mod wav;

pub use bridge::{AtomicParam, SynthCommand, SynthController};
pub use stream::{
    AudioDevice, AudioStream, StreamConfig, default_output_device, find_device_by_index,
    list_devices,
};
pub use wav::{WavSpec, read_wav, write_wav, write_wav_stereo};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
