use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use rodio::{Decoder, OutputStream, Sink};

use crate::paths;

/// Play a captured artifact through the default output device. With no
/// target the most recent local capture is used; otherwise `target` is a
/// WAV path.
pub fn play(target: Option<&str>) -> Result<()> {
    let path = resolve_target(target)?;
    anyhow::ensure!(path.exists(), "File not found: {}", path.display());

    println!("Playing {}", style(path.display()).green());

    // The OutputStream is an RAII guard for the device; it has to outlive
    // the sink or playback cuts off.
    let (_stream, handle) =
        OutputStream::try_default().context("Failed to open audio output device")?;
    let sink = Sink::try_new(&handle).context("Failed to create playback sink")?;

    let file = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open: {}", path.display()))?;
    sink.append(
        Decoder::new(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to decode: {}", path.display()))?,
    );

    sink.sleep_until_end();
    println!("Done.");
    Ok(())
}

fn resolve_target(target: Option<&str>) -> Result<PathBuf> {
    match target {
        Some(path) => Ok(PathBuf::from(path)),
        None => paths::latest_artifact()
            .context("No local recordings yet. Record one first, or pass a file path."),
    }
}
