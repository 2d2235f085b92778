//! Application settings and user preferences
//!
//! Configuration is loaded from `<data dir>/config.json`. Every field has a
//! default, so a missing file yields a fully usable `Config`. A malformed
//! file also falls back to defaults with a warning - unlike the notes
//! snapshot, config is advisory and never worth failing startup over.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default debounce for reconciling editor edits into the store.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 300;

/// Default AI provider selector.
pub const DEFAULT_AI_PROVIDER: &str = "openai";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Override for the data directory (default: `~/.quicknotes`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Milliseconds of editor inactivity before an edit reaches the store
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,

    /// Provider selected for AI chat ("openai" or "google")
    #[serde(default = "default_ai_provider")]
    pub ai_provider: String,
}

fn default_autosave_debounce_ms() -> u64 {
    DEFAULT_AUTOSAVE_DEBOUNCE_MS
}

fn default_ai_provider() -> String {
    DEFAULT_AI_PROVIDER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            ai_provider: DEFAULT_AI_PROVIDER.to_string(),
        }
    }
}

impl Config {
    /// The directory holding the snapshot, config, and logs.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Path of the persisted note snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir().join("notes.json")
    }
}

/// Default data directory (`~/.quicknotes`, temp dir fallback).
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".quicknotes"))
        .unwrap_or_else(|| std::env::temp_dir().join("quicknotes"))
}

/// Path of the config file itself.
pub fn config_path() -> PathBuf {
    default_data_dir().join("config.json")
}

/// Load configuration, falling back to defaults when the file is missing
/// or unreadable.
pub fn load_config() -> Config {
    let path = config_path();

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(_) => {
            debug!(path = %path.display(), "No config file, using defaults");
            return Config::default();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(config) => {
            debug!(path = %path.display(), "Config loaded");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
            Config::default()
        }
    }
}
