use anyhow::{Context, Result};
use console::style;

use crate::api::types::RecordingMeta;
use crate::api::ApiClient;
use crate::cache;
use crate::util;

/// List the user's uploaded recordings, most recent first and highlighted.
pub fn run_list(client: &ApiClient) -> Result<()> {
    let recordings = client.list_recordings()?;

    if recordings.is_empty() {
        println!("No recordings yet. Run {} to make one.", style("voicelens record").cyan());
        return Ok(());
    }

    let latest_id = most_recent(&recordings).map(|r| r.id.clone());

    println!();
    println!(
        "  {:<26} {:<24} {:<17} {}",
        style("file id").bold(),
        style("name").bold(),
        style("created").bold(),
        style("transcript").bold(),
    );

    for rec in &recordings {
        let marker = if Some(&rec.id) == latest_id.as_ref() {
            style("●").green().to_string()
        } else {
            " ".to_string()
        };
        let has_transcript = if rec.transcript.as_deref().is_some_and(|t| !t.is_empty()) {
            style("yes").green().to_string()
        } else {
            style("—").dim().to_string()
        };

        println!(
            "{marker} {:<26} {:<24} {:<17} {has_transcript}",
            rec.file_id,
            truncate(&rec.file_name, 24),
            util::format_created_at(&rec.created_at),
        );
    }

    println!();
    println!(
        "  {} entries · {} shows the analysis",
        recordings.len(),
        style("voicelens analyze pitch <file-id>").cyan()
    );
    Ok(())
}

/// Delete a recording server-side, then invalidate its cached analyses so
/// no stale entry outlives it.
pub fn run_delete(client: &ApiClient, id: &str, assume_yes: bool) -> Result<()> {
    let recordings = client.list_recordings()?;
    let target = recordings
        .iter()
        .find(|r| r.id == id || r.file_id == id)
        .with_context(|| format!("No recording matching \"{id}\""))?;

    if !assume_yes {
        let answer = prompt(&format!(
            "Delete \"{}\" ({})? [y/N] ",
            target.file_name, target.file_id
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Kept.");
            return Ok(());
        }
    }

    client.delete_recording(&target.id)?;

    let removed = cache::invalidate(&target.file_id)?;
    log::debug!("dropped {removed} cached analyses for {}", target.file_id);

    println!("Deleted \"{}\".", target.file_name);
    Ok(())
}

/// Explicit cache invalidation without touching the server.
pub fn run_forget(file_id: &str) -> Result<()> {
    let removed = cache::invalidate(file_id)?;
    if removed == 0 {
        println!("Nothing cached for {file_id}.");
    } else {
        println!("Dropped {removed} cached analyses for {file_id}.");
    }
    Ok(())
}

fn most_recent(recordings: &[RecordingMeta]) -> Option<&RecordingMeta> {
    recordings.iter().max_by_key(|r| r.created_at.clone())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn prompt(message: &str) -> Result<String> {
    use std::io::Write as _;
    print!("{message}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, created_at: &str) -> RecordingMeta {
        RecordingMeta {
            id: id.into(),
            file_id: format!("file-{id}"),
            file_name: format!("take {id}"),
            created_at: created_at.into(),
            transcript: None,
        }
    }

    #[test]
    fn most_recent_by_created_at() {
        let recordings = vec![
            meta("a", "2026-08-01T10:00:00+00:00"),
            meta("b", "2026-08-03T09:00:00+00:00"),
            meta("c", "2026-08-02T23:59:00+00:00"),
        ];
        assert_eq!(most_recent(&recordings).unwrap().id, "b");
    }

    #[test]
    fn most_recent_of_empty_is_none() {
        assert!(most_recent(&[]).is_none());
    }

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("short", 24), "short");
    }

    #[test]
    fn truncate_caps_long_names() {
        let long = "a very long recording title that overflows";
        let out = truncate(long, 10);
        assert!(out.chars().count() <= 10);
        assert!(out.ends_with('…'));
    }
}
