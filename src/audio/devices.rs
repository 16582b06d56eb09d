use anyhow::{Context, Result};
use console::style;
use cpal::traits::{DeviceTrait, HostTrait};

/// Print the available input devices and their default configs, marking
/// the one a recording session would use.
pub fn list_devices() -> Result<()> {
    let host = cpal::default_host();

    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok());

    let devices = host
        .input_devices()
        .context("Failed to enumerate input devices")?;

    println!("{}", style("Input devices:").bold());

    let mut found = false;
    for device in devices {
        found = true;
        let name = device.name().unwrap_or_else(|_| "<unknown>".into());
        let marker = if Some(&name) == default_name.as_ref() {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };

        match device.default_input_config() {
            Ok(config) => println!(
                "  {marker} {name}  ({} Hz, {} ch, {:?})",
                config.sample_rate().0,
                config.channels(),
                config.sample_format()
            ),
            Err(_) => println!("  {marker} {name}  (no usable input config)"),
        }
    }

    if !found {
        println!("  {}", style("none found").yellow());
    }

    Ok(())
}
