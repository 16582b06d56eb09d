use std::io::Write as _;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use console::style;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::ApiClient;
use crate::paths;
use crate::util;

use super::capture::MicBackend;
use super::session::{RecordingSession, SessionStatus};

/// Elapsed-clock cadence.
const SAMPLE_TICK: Duration = Duration::from_millis(1000);
/// Waveform meter cadence.
const VOLUME_TICK: Duration = Duration::from_millis(100);

/// A waveform column above this normalized level renders as "hot".
const HOT_LEVEL: f32 = 0.05;

/// Interactive recording flow: capture with live timer and waveform,
/// then offer to upload the artifact.
pub fn run(client: &ApiClient, title: Option<String>) -> Result<()> {
    println!();
    println!(
        "{} {} pause   {} resume   {} stop",
        style("Recording controls:").bold(),
        style("[p]").cyan(),
        style("[r]").cyan(),
        style("[Enter]").cyan(),
    );
    println!();

    let backend = MicBackend;
    let mut session = RecordingSession::new();
    session.start(&backend, paths::new_artifact_path())?;

    crossterm::terminal::enable_raw_mode()?;
    let outcome = capture_loop(&mut session);
    crossterm::terminal::disable_raw_mode()?;
    println!();

    let (elapsed, artifact) = outcome?;
    println!(
        "  Recorded {} to {}",
        style(util::format_clock(elapsed)).bold(),
        style(artifact.display()).green()
    );
    println!();

    if !confirm("Save to library?")? {
        println!(
            "  Discarded. Local file kept at {}",
            style(artifact.display()).dim()
        );
        session.reset();
        return Ok(());
    }

    let name = match title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => {
            let entered = prompt_line("Title (blank for default): ")?;
            if entered.is_empty() {
                format!("Recording_{}", chrono::Local::now().format("%Y%m%d%H%M%S"))
            } else {
                entered
            }
        }
    };

    upload(client, &artifact, &name);
    session.reset();
    Ok(())
}

/// Drive the session until the user stops it. Returns the final elapsed
/// time and the artifact path.
fn capture_loop(session: &mut RecordingSession) -> Result<(u64, std::path::PathBuf)> {
    let mut next_sample = Instant::now() + SAMPLE_TICK;
    let mut next_volume = Instant::now() + VOLUME_TICK;

    loop {
        if event::poll(Duration::from_millis(25))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('p') if session.status() == SessionStatus::Recording => {
                        session.pause()?;
                        draw_status(session, true)?;
                    }
                    KeyCode::Char('r') if session.status() == SessionStatus::Paused => {
                        session.resume()?;
                        // Re-arm both tickers so the paused stretch
                        // doesn't produce catch-up ticks.
                        next_sample = Instant::now() + SAMPLE_TICK;
                        next_volume = Instant::now() + VOLUME_TICK;
                    }
                    KeyCode::Enter => {
                        let elapsed = session.elapsed_seconds();
                        let path = session.stop()?;
                        return Ok((elapsed, path));
                    }
                    _ => {}
                }
            }
        }

        // Tickers only run while Recording; Paused schedules nothing.
        if session.status() == SessionStatus::Recording {
            let now = Instant::now();
            if now >= next_sample {
                session.sample_tick();
                next_sample += SAMPLE_TICK;
            }
            if now >= next_volume {
                session.volume_tick();
                next_volume += VOLUME_TICK;
            }
            draw_status(session, false)?;
        }
    }
}

/// Redraw the single status line: state dot, clock, waveform strip.
fn draw_status(session: &RecordingSession, paused: bool) -> Result<()> {
    let dot = if paused {
        style("‖").yellow()
    } else {
        style("●").red()
    };

    let strip: String = session
        .waveform()
        .iter()
        .map(|&v| if v > HOT_LEVEL { '▌' } else { '·' })
        .collect();

    let mut out = std::io::stdout();
    write!(
        out,
        "\r  {dot} {}  {}",
        style(util::format_clock(session.elapsed_seconds())).bold(),
        style(strip).dim()
    )?;
    out.flush()?;
    Ok(())
}

fn upload(client: &ApiClient, artifact: &Path, name: &str) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Uploading \"{name}\"..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    match client.upload_recording(artifact, name) {
        Ok(()) => {
            spinner.finish_and_clear();
            println!("  {} Uploaded \"{name}\"", style("OK").green().bold());
        }
        Err(err) => {
            spinner.finish_and_clear();
            // Single attempt only; the artifact stays on disk for a retry.
            log::error!("upload failed: {err:#}");
            eprintln!(
                "  {} Upload failed: {err}\n  Artifact kept at {}",
                style("ERROR").red().bold(),
                artifact.display()
            );
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{question} [Y/n] "))?;
    Ok(answer.is_empty() || answer.eq_ignore_ascii_case("y"))
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("  {prompt}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}
