//! Offline rendering command.

use crate::patch::Patch;
use aditivo_io::{WavSpec, write_wav, write_wav_stereo};
use aditivo_synth::{AdditiveEngine, EngineConfig, EnvelopeParams, Preset};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

const BLOCK: usize = 256;

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Note frequencies in Hz (repeat for a chord)
    #[arg(long = "freq", default_value = "440.0")]
    freqs: Vec<f32>,

    /// Held note duration in seconds
    #[arg(long, default_value = "1.0")]
    duration: f32,

    /// Extra tail rendered after note-off, in seconds
    #[arg(long, default_value = "2.0")]
    tail: f32,

    /// Sample rate
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

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

    /// Envelope attack,decay,sustain,release (seconds,seconds,level,seconds)
    #[arg(long, value_delimiter = ',')]
    envelope: Option<Vec<f32>>,

    /// Bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bits: u16,

    /// Write mono instead of stereo
    #[arg(long)]
    mono: bool,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if args.freqs.is_empty() {
        anyhow::bail!("at least one --freq is required");
    }
    if args.duration <= 0.0 {
        anyhow::bail!("--duration must be positive");
    }
    if !matches!(args.bits, 16 | 24 | 32) {
        anyhow::bail!("--bits must be 16, 24, or 32, got {}", args.bits);
    }

    let mut engine = AdditiveEngine::new(EngineConfig {
        sample_rate: args.sample_rate as f32,
        harmonics: args.harmonics,
        voices: args.voices,
    })?;

    if let Some(path) = &args.patch {
        let patch = Patch::load(path)?;
        info!("loaded patch '{}'", patch.name);
        patch.apply_to(&mut engine)?;
    }

    // Command-line knobs override the patch
    if let Some(name) = &args.preset {
        let preset =
            Preset::from_name(name).ok_or_else(|| anyhow::anyhow!("unknown preset '{}'", name))?;
        engine.set_preset(preset);
    }
    if let Some(env) = &args.envelope {
        let [attack, decay, sustain, release] = env.as_slice() else {
            anyhow::bail!("--envelope expects exactly 4 values: attack,decay,sustain,release");
        };
        engine.set_envelope(EnvelopeParams::new(*attack, *decay, *sustain, *release));
    }
    if let Some(volume) = args.volume {
        engine.set_volume(volume);
    }

    for (i, &freq) in args.freqs.iter().enumerate() {
        if freq <= 0.0 {
            anyhow::bail!("--freq must be positive, got {}", freq);
        }
        engine.note_on(i as u32, freq);
    }

    let held_samples = (args.duration * args.sample_rate as f32) as usize;
    let tail_samples = (args.tail * args.sample_rate as f32) as usize;
    let total = held_samples + tail_samples;

    let mut left = Vec::with_capacity(total);
    let mut right = Vec::with_capacity(total);
    let mut block_l = [0.0f32; BLOCK];
    let mut block_r = [0.0f32; BLOCK];

    let mut rendered = 0;
    let mut released = false;
    while rendered < total {
        if !released && rendered >= held_samples {
            engine.all_notes_off();
            released = true;
        }
        let n = BLOCK.min(total - rendered);
        engine.process_block(&mut block_l[..n], &mut block_r[..n]);
        left.extend_from_slice(&block_l[..n]);
        right.extend_from_slice(&block_r[..n]);
        rendered += n;
    }

    let spec = WavSpec {
        channels: if args.mono { 1 } else { 2 },
        sample_rate: args.sample_rate,
        bits_per_sample: args.bits,
    };

    if args.mono {
        write_wav(&args.output, &left, spec)?;
    } else {
        write_wav_stereo(&args.output, &left, &right, spec)?;
    }

    println!(
        "Rendered {} note(s) for {:.2}s (+{:.2}s tail) to {}",
        args.freqs.len(),
        args.duration,
        args.tail,
        args.output.display()
    );
    Ok(())
}
