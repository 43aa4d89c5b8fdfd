//! Aditivo CLI - Command-line interface for the aditivo additive synthesizer.

mod commands;
mod patch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aditivo")]
#[command(author, version, about = "Aditivo additive synthesizer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render notes to a WAV file
    Render(commands::render::RenderArgs),

    /// Play notes through the audio output in real time
    Play(commands::play::PlayArgs),

    /// List built-in spectrum presets
    Presets(commands::presets::PresetsArgs),

    /// List audio output devices
    Devices(commands::devices::DevicesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Devices(args) => commands::devices::run(args),
    }
}
