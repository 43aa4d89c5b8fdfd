//! Real-time audio output via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, Stream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Audio output device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

/// Stream configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Buffer size in frames.
    pub buffer_size: u32,
    /// Output device name or index (uses default if `None`).
    pub output_device: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            output_device: None,
        }
    }
}

/// List all available audio output devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                let (sample_rate, channels) = device
                    .default_output_config()
                    .map(|c| (c.sample_rate(), c.channels()))
                    .unwrap_or((48000, 2));

                devices.push(AudioDevice {
                    name,
                    default_sample_rate: sample_rate,
                    channels,
                });
            }
        }
    }

    Ok(devices)
}

/// Get the default audio output device info, if one exists.
pub fn default_output_device() -> Option<AudioDevice> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| {
            let (sample_rate, channels) = d
                .default_output_config()
                .map(|c| (c.sample_rate(), c.channels()))
                .unwrap_or((48000, 2));
            AudioDevice {
                name,
                default_sample_rate: sample_rate,
                channels,
            }
        })
    })
}

/// Find an output device by index.
pub fn find_device_by_index(index: usize) -> Result<AudioDevice> {
    let devices = list_devices()?;
    devices.get(index).cloned().ok_or_else(|| {
        Error::DeviceNotFound(format!(
            "output device index {} (only {} devices available)",
            index,
            devices.len()
        ))
    })
}

/// Real-time audio output stream.
pub struct AudioStream {
    #[allow(dead_code)]
    host: Host,
    output_device: Device,
    config: StreamConfig,
    running: Arc<AtomicBool>,
    _output_stream: Option<Stream>,
}

impl AudioStream {
    /// Create a new audio stream with the given configuration.
    pub fn new(config: StreamConfig) -> Result<Self> {
        let host = cpal::default_host();

        let output_device = match &config.output_device {
            Some(name) => find_output_device(&host, name)?,
            None => host.default_output_device().ok_or(Error::NoDevice)?,
        };

        Ok(Self {
            host,
            output_device,
            config,
            running: Arc::new(AtomicBool::new(false)),
            _output_stream: None,
        })
    }

    /// Get the configured sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Get the output device channel count.
    pub fn output_channels(&self) -> u16 {
        self.output_device
            .default_output_config()
            .map(|c| c.channels())
            .unwrap_or(2)
    }

    /// Sample rate the output device will actually run at.
    pub fn device_sample_rate(&self) -> u32 {
        self.output_device
            .default_output_config()
            .map(|c| c.sample_rate())
            .unwrap_or(self.config.sample_rate)
    }

    /// Run the output stream with a generator callback.
    ///
    /// The callback must fill the interleaved output buffer. This function
    /// blocks until [`stop`](Self::stop) is called from another thread.
    pub fn run_output<F>(&mut self, mut generate: F) -> Result<()>
    where
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        let output_config = self
            .output_device
            .default_output_config()
            .map_err(|e| Error::Stream(e.to_string()))?;

        let running = Arc::clone(&self.running);
        self.running.store(true, Ordering::SeqCst);

        let output_running = Arc::clone(&running);
        let output_stream = self
            .output_device
            .build_output_stream(
                &output_config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if output_running.load(Ordering::SeqCst) {
                        generate(data);
                    } else {
                        data.fill(0.0);
                    }
                },
                |err| warn!("Output stream error: {}", err),
                None,
            )
            .map_err(|e| Error::Stream(e.to_string()))?;

        output_stream
            .play()
            .map_err(|e| Error::Stream(e.to_string()))?;
        self._output_stream = Some(output_stream);

        // Block until stopped
        while self.running.load(Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_millis(100));
        }

        Ok(())
    }

    /// Stop the audio stream.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the stream is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the running flag for cross-thread shutdown.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }
}

/// Find an output device by exact name, partial name, or index.
///
/// The `name_or_index` can be:
/// - A numeric index (e.g., "0", "1")
/// - An exact device name
/// - A partial device name (case-insensitive fuzzy match)
fn find_output_device(host: &Host, name_or_index: &str) -> Result<Device> {
    let devices: Vec<_> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    // Try parsing as index first
    if let Ok(index) = name_or_index.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {} (only {} devices available)",
                index,
                devices.len()
            ))
        });
    }

    // Try exact match
    for device in &devices {
        if device_name(device).is_ok_and(|n| n == name_or_index) {
            return Ok(device.clone());
        }
    }

    // Try case-insensitive partial match
    let search_lower = name_or_index.to_lowercase();
    let mut matches: Vec<_> = devices
        .iter()
        .filter_map(|d| {
            device_name(d).ok().and_then(|name| {
                if name.to_lowercase().contains(&search_lower) {
                    Some((d.clone(), name))
                } else {
                    None
                }
            })
        })
        .collect();

    match matches.len() {
        0 => Err(Error::DeviceNotFound(format!(
            "no output device matching '{}'",
            name_or_index
        ))),
        1 => Ok(matches.remove(0).0),
        _ => {
            let names: Vec<_> = matches.iter().map(|(_, n)| n.as_str()).collect();
            warn!(
                "'{}' matches multiple output devices: {:?}. Using first match: {}",
                name_or_index, names, names[0]
            );
            Ok(matches.remove(0).0)
        }
    }
}
