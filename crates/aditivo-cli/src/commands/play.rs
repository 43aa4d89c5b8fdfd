//! Real-time playback command.

use crate::patch::Patch;
use aditivo_io::{AudioStream, StreamConfig, SynthCommand, SynthController};
use aditivo_synth::{AdditiveEngine, EngineConfig, EnvelopeParams, Preset};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args)]
pub struct PlayArgs {
    /// Note frequencies in Hz (repeat for a chord)
    #[arg(long = "freq", default_value = "440.0")]
    freqs: Vec<f32>,

    /// Held note duration in seconds (plays until Ctrl+C if omitted)
    #[arg(long)]
    duration: Option<f32>,

    /// Harmonics per voice
    #[arg(long, default_value = "16")]
    harmonics: usize,

    /// Voice pool size
    #[arg(long, default_value = "6")]
    voices: usize,

    /// Built-in spectrum preset (sine, triangle, sawtooth, square)
    #[arg(long)]
    preset: Option<String>,

    /// Patch file (TOML)
    #[arg(long)]
    patch: Option<PathBuf>,

    /// Overall volume (0-1), overrides the patch when given
    #[arg(long)]
    volume: Option<f32>,

    /// Output device name or index
    #[arg(long)]
    output_device: Option<String>,

    /// Buffer size in frames
    #[arg(long, default_value = "256")]
    buffer_size: u32,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let config = StreamConfig {
        sample_rate: 48000,
        buffer_size: args.buffer_size,
        output_device: args.output_device.clone(),
    };
    let mut stream = AudioStream::new(config)?;

    // The engine must run at whatever rate the device actually opens with
    let sample_rate = stream.device_sample_rate();
    let channels = stream.output_channels() as usize;

    let mut engine = AdditiveEngine::new(EngineConfig {
        sample_rate: sample_rate as f32,
        harmonics: args.harmonics,
        voices: args.voices,
    })?;

    let controller = Arc::new(SynthController::new());
    controller.volume().set(0.8);

    if let Some(path) = &args.patch {
        let patch = Patch::load(path)?;
        println!("Loading patch: {}", patch.name);
        patch.apply_to(&mut engine)?;
        controller.volume().set(patch.volume);
        controller.modulation_cents().set(patch.modulation_cents);
    }
    if let Some(volume) = args.volume {
        controller.volume().set(volume);
    }
    if let Some(name) = &args.preset {
        let preset =
            Preset::from_name(name).ok_or_else(|| anyhow::anyhow!("unknown preset '{}'", name))?;
        controller.send(SynthCommand::SetPreset(preset));
    }

    for (i, &freq) in args.freqs.iter().enumerate() {
        if freq <= 0.0 {
            anyhow::bail!("--freq must be positive, got {}", freq);
        }
        controller.note_on(i as u32, freq);
    }

    println!("Playing {} note(s) at {} Hz", args.freqs.len(), sample_rate);
    match args.duration {
        Some(secs) => println!("  Duration: {:.2}s", secs),
        None => println!("  Press Ctrl+C to stop..."),
    }

    // Ctrl+C releases the notes and stops the stream
    let running = stream.running_flag();
    {
        let controller = Arc::clone(&controller);
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            controller.send(SynthCommand::AllNotesOff);
            running.store(false, std::sync::atomic::Ordering::SeqCst);
        })?;
    }

    // Timed playback: release after the hold, stop after the release tail
    if let Some(secs) = args.duration {
        let controller = Arc::clone(&controller);
        let running = Arc::clone(&running);
        let tail = release_tail(args.patch.as_deref())?;
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs_f32(secs));
            controller.send(SynthCommand::AllNotesOff);
            std::thread::sleep(Duration::from_secs_f32(tail));
            running.store(false, std::sync::atomic::Ordering::SeqCst);
        });
    }

    // The requested buffer size is only a hint; devices may deliver larger
    // callbacks. Size the scratch buffers up front so the resize below
    // stays within capacity and never allocates on the audio thread.
    const MAX_CALLBACK_FRAMES: usize = 16384;
    let scratch = MAX_CALLBACK_FRAMES.max(args.buffer_size as usize);

    let audio_controller = Arc::clone(&controller);
    let mut left = vec![0.0f32; scratch];
    let mut right = vec![0.0f32; scratch];
    stream.run_output(move |data| {
        let frames = data.len() / channels.max(1);
        left.resize(frames, 0.0);
        right.resize(frames, 0.0);

        audio_controller.apply_to(&mut engine);
        engine.process_block(&mut left, &mut right);

        match channels {
            1 => data.copy_from_slice(&left),
            _ => {
                for (i, frame) in data.chunks_mut(channels).enumerate() {
                    frame[0] = left[i];
                    frame[1] = right[i];
                    for extra in &mut frame[2..] {
                        *extra = 0.0;
                    }
                }
            }
        }
    })?;

    println!("Done!");
    Ok(())
}

/// How long to keep the stream alive after note-off so the release finishes.
fn release_tail(patch: Option<&std::path::Path>) -> anyhow::Result<f32> {
    let release = match patch {
        Some(path) => Patch::load(path)?
            .envelope
            .map(|e| e.release)
            .unwrap_or(EnvelopeParams::default().release_secs),
        None => EnvelopeParams::default().release_secs,
    };
    // Exponential releases take roughly ten time constants to fall silent
    Ok(release * 10.0 + 0.1)
}
