//! Audio device listing command.

use aditivo_io::{default_output_device, list_devices};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    command: Option<DevicesCommand>,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all available output devices
    List,

    /// Show default output device information
    Info,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => {
            let devices = list_devices()?;

            if devices.is_empty() {
                println!("No audio output devices found.");
                return Ok(());
            }

            println!("Available Output Devices");
            println!("========================\n");
            for (idx, device) in devices.iter().enumerate() {
                println!(
                    "  [{}] {} ({} Hz, {} ch)",
                    idx, device.name, device.default_sample_rate, device.channels
                );
            }
            println!("\nTotal: {} output(s)", devices.len());
            println!();
            println!("Tip: Use device index or partial name with --output-device:");
            println!("  aditivo play --freq 440 --output-device 0");
        }
        DevicesCommand::Info => match default_output_device() {
            Some(device) => {
                println!("Default output device:");
                println!("  Name: {}", device.name);
                println!("  Sample rate: {} Hz", device.default_sample_rate);
                println!("  Channels: {}", device.channels);
            }
            None => println!("No default output device available."),
        },
    }
    Ok(())
}
