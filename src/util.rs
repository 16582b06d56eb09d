use chrono::{DateTime, Local};

/// Format elapsed seconds as m:ss for the recording timer.
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render a server `createdAt` timestamp (RFC 3339) in local time.
/// Unparseable values are shown as-is rather than hidden.
pub fn format_created_at(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Convert a linear RMS level (0..=1) into dB relative to full scale.
/// Returns -infinity for silence.
pub fn level_dbfs(rms: f32) -> f32 {
    if rms > 0.0 {
        20.0 * rms.log10()
    } else {
        f32::NEG_INFINITY
    }
}
