//! Preset listing command.

use aditivo_synth::Preset;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: Option<PresetsCommand>,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List all built-in presets
    List,

    /// Show the gain vector a preset produces
    Show {
        /// Preset name (sine, triangle, sawtooth, square)
        name: String,

        /// Number of harmonics to show
        #[arg(long, default_value = "16")]
        harmonics: usize,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(PresetsCommand::List) {
        PresetsCommand::List => {
            println!("Built-in Presets");
            println!("================\n");
            for preset in Preset::ALL {
                println!("  [{}] {:<10} {}", preset.id(), preset.name(), describe(preset));
            }
            println!("\nUse with: aditivo render out.wav --preset <name>");
        }
        PresetsCommand::Show { name, harmonics } => {
            let preset = Preset::from_name(&name)
                .ok_or_else(|| anyhow::anyhow!("unknown preset '{}'", name))?;

            println!("{} (id {})", preset.name(), preset.id());
            println!("Harmonic gains:");
            for (h, gain) in preset.gains(harmonics).iter().enumerate() {
                println!("  h{:<3} {:.4}", h + 1, gain);
            }
        }
    }
    Ok(())
}

fn describe(preset: Preset) -> &'static str {
    match preset {
        Preset::Sine => "fundamental only",
        Preset::Triangle => "odd harmonics, 1/n^2 falloff",
        Preset::Sawtooth => "all harmonics, 1/n falloff",
        Preset::Square => "odd harmonics, 1/n falloff",
    }
}
