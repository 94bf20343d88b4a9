//! Local preference persistence
//!
//! A small JSON file holding the preferences that must survive app
//! restarts. Currently a single flag: whether water reminders are
//! enabled.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

/// File name under the platform data directory.
const PREFS_FILE: &str = "preferences.json";
/// Application directory under the platform data directory.
const APP_DIR: &str = "vida-fitpro";

/// Persisted preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub water_reminders_enabled: bool,
}

/// Loads and saves [`Preferences`] at a fixed path.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    /// Store at the platform's per-user data directory.
    pub fn default_location() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join(APP_DIR).join(PREFS_FILE),
        }
    }

    /// Store at an explicit path (tests, portable installs).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences; defaults when the file is missing or
    /// unreadable. A corrupt file is logged and replaced on next save.
    pub async fn load(&self) -> Preferences {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(prefs) => prefs,
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "corrupt preferences file");
                    Preferences::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Preferences::default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read preferences");
                Preferences::default()
            }
        }
    }

    pub async fn save(&self, prefs: &Preferences) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, raw).await
    }
}
