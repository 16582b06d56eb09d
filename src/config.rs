use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths;

/// Application configuration, loaded from <config_dir>/config.toml.
///
/// Every field carries a default, so the file is optional and may be
/// partial; `#[serde(default)]` fills in whatever the user left out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub recording: RecordingConfig,
    pub chart: ChartConfig,
}

/// Where the backend lives. The service is split in two: one host handles
/// auth and recording CRUD, the other serves analysis payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_url: String,
    pub analysis_url: String,
    /// Per-request timeout for everything except the analysis fetch,
    /// which waits as long as the server needs.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub sample_rate: u32,
    pub channels: u16,
    pub device: String,
}

/// Geometry for rendered chart PNGs. Width grows with the length of the
/// series (the chart keeps every sample), bounded by min/max.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub height_px: u32,
    pub px_per_second: u32,
    pub min_width_px: u32,
    pub max_width_px: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            recording: RecordingConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5001".into(),
            analysis_url: "http://127.0.0.1:5002".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            device: "default".into(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height_px: 480,
            px_per_second: 40,
            min_width_px: 800,
            max_width_px: 4000,
        }
    }
}

/// Load the application config, falling back to defaults when the file
/// doesn't exist.
pub fn load_config() -> Result<AppConfig> {
    let path = paths::config_file();

    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.timeout_secs, 30);
        assert_eq!(cfg.recording.sample_rate, 44100);
        assert!(cfg.server.api_url.starts_with("http://"));
    }

    #[test]
    fn parse_partial_toml() {
        // A file that only overrides the server block keeps all other defaults
        let toml_str = r#"
[server]
api_url = "https://voice.example.com"
"#;
        let cfg: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.server.api_url, "https://voice.example.com");
        assert_eq!(cfg.server.timeout_secs, 30);
        assert_eq!(cfg.chart.height_px, 480);
    }

    #[test]
    fn roundtrip_toml() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let loaded: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(loaded.server.api_url, cfg.server.api_url);
        assert_eq!(loaded.chart.px_per_second, cfg.chart.px_per_second);
    }
}
