use std::path::PathBuf;
use std::sync::OnceLock;

/// XDG-compliant directory layout for voicelens.
///
/// On Linux:
///   Config:  $XDG_CONFIG_HOME/voicelens  (~/.config/voicelens)
///   Data:    $XDG_DATA_HOME/voicelens    (~/.local/share/voicelens)
///
/// On macOS both resolve under ~/Library/Application Support/voicelens.
/// The `dirs` crate handles platform detection; resolved base paths are
/// cached in OnceLock cells so the lookup happens once per process.

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Root data directory: $XDG_DATA_HOME/voicelens
pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voicelens")
    })
}

/// Root config directory: $XDG_CONFIG_HOME/voicelens
pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voicelens")
    })
}

/// Config file path: <config_dir>/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Local recordings directory (captured WAV artifacts before upload).
pub fn recordings_dir() -> PathBuf {
    data_dir().join("recordings")
}

/// Rendered chart PNGs: <data_dir>/charts
pub fn charts_dir() -> PathBuf {
    data_dir().join("charts")
}

/// Analysis cache database: <data_dir>/cache.db
pub fn cache_db_path() -> PathBuf {
    data_dir().join("cache.db")
}

/// Persisted bearer token: <data_dir>/token
pub fn token_file() -> PathBuf {
    data_dir().join("token")
}

/// Path for a freshly captured artifact, stamped with the local time.
pub fn new_artifact_path() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    recordings_dir().join(format!("capture_{stamp}.wav"))
}

/// Chart output path for a recording and analysis kind.
pub fn chart_path(file_id: &str, kind: &str) -> PathBuf {
    charts_dir().join(format!("{file_id}_{kind}.png"))
}

/// Most recently modified WAV in the recordings directory, if any.
pub fn latest_artifact() -> Option<PathBuf> {
    let entries = std::fs::read_dir(recordings_dir()).ok()?;
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "wav"))
        .max_by_key(|p| {
            p.metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        })
}
