use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use anyhow::{Context, Result};

use crate::paths;

type AuthListener = Box<dyn Fn(Option<&str>) + Send>;

/// Process-wide holder for the bearer token.
///
/// The token is read from disk once at startup and cached; API calls take
/// the context by reference instead of re-reading storage per request.
/// Login, logout, and account deletion go through `set_token`/`clear`,
/// which persist the change and notify subscribers.
pub struct AuthContext {
    token_path: PathBuf,
    token: RwLock<Option<String>>,
    listeners: Mutex<Vec<AuthListener>>,
}

impl AuthContext {
    /// Load the persisted token from the default location.
    pub fn load() -> Self {
        Self::load_from(paths::token_file())
    }

    /// Load from an explicit path (tests point this at a tempdir).
    pub fn load_from(token_path: PathBuf) -> Self {
        let token = read_token_file(&token_path);
        Self {
            token_path,
            token: RwLock::new(token),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Current token, if logged in.
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    /// Token or `AuthMissing`.
    pub fn require_token(&self) -> Result<String, crate::error::ClientError> {
        self.token().ok_or(crate::error::ClientError::AuthMissing)
    }

    /// Store a new token, persist it, and notify subscribers.
    pub fn set_token(&self, token: &str) -> Result<()> {
        write_token_file(&self.token_path, token)?;
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
        self.notify(Some(token));
        Ok(())
    }

    /// Drop the token (logout / account deletion) and notify subscribers.
    pub fn clear(&self) -> Result<()> {
        if self.token_path.exists() {
            std::fs::remove_file(&self.token_path).with_context(|| {
                format!("Failed to remove token file: {}", self.token_path.display())
            })?;
        }
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
        self.notify(None);
        Ok(())
    }

    /// Register a callback fired on every auth change with the new token.
    pub fn subscribe(&self, listener: impl Fn(Option<&str>) + Send + 'static) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(Box::new(listener));
        }
    }

    fn notify(&self, token: Option<&str>) {
        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(token);
            }
        }
    }
}

fn read_token_file(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let token = contents.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn write_token_file(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, token)
        .with_context(|| format!("Failed to write token file: {}", path.display()))?;

    // The token is a credential; keep it out of other users' reach.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }

    Ok(())
}
