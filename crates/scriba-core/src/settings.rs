//! Persistent settings: provider selection, endpoints, credentials, language,
//! and notification durations.
//!
//! Stored as JSON under the user config directory. Environment variables
//! override the stored credentials so keys never have to touch disk.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ProviderKind;

/// Default OpenAI-compatible transcription endpoint.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
/// Default model sent with every upload.
pub const DEFAULT_API_MODEL: &str = "whisper-1";
/// Default streaming recognizer endpoint.
pub const DEFAULT_LIVE_URL: &str = "wss://api.deepgram.com/v1/listen";
/// Default streaming recognizer model.
pub const DEFAULT_LIVE_MODEL: &str = "nova-3";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default = "default_api_url")]
    pub endpoint: String,
    #[serde(default = "default_api_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveSettings {
    #[serde(default = "default_live_url")]
    pub endpoint: String,
    #[serde(default = "default_live_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Seconds an error notification stays visible
    #[serde(default = "default_error_secs")]
    pub error_secs: u64,
    /// Seconds a success notification stays visible
    #[serde(default = "default_success_secs")]
    pub success_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_api_model() -> String {
    DEFAULT_API_MODEL.to_string()
}
fn default_live_url() -> String {
    DEFAULT_LIVE_URL.to_string()
}
fn default_live_model() -> String {
    DEFAULT_LIVE_MODEL.to_string()
}
fn default_error_secs() -> u64 {
    5
}
fn default_success_secs() -> u64 {
    3
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            endpoint: default_api_url(),
            model: default_api_model(),
            api_key: None,
        }
    }
}

impl Default for LiveSettings {
    fn default() -> Self {
        LiveSettings {
            endpoint: default_live_url(),
            model: default_live_model(),
            api_key: None,
        }
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            error_secs: default_error_secs(),
            success_secs: default_success_secs(),
        }
    }
}

/// Top-level settings document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub provider: ProviderKind,
    /// Language hint passed to either provider (None = auto-detect)
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub live: LiveSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Settings {
    /// Path of the settings file (`<config dir>/scriba/config.json`).
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("scriba").join("config.json"))
    }

    /// Load settings from disk, falling back to defaults.
    ///
    /// A missing or unreadable file yields defaults; a malformed file is
    /// reported in verbose mode and otherwise ignored.
    pub fn load() -> Settings {
        let Some(path) = Self::path() else {
            return Settings::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                crate::verbose!("Ignoring malformed settings at {}: {e}", path.display());
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    /// Persist settings to disk, creating the config directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::path().context("Could not determine config directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Resolve the credential for a provider kind: environment first, then the
    /// settings file.
    pub fn api_key_for(&self, kind: ProviderKind) -> Option<String> {
        if let Ok(key) = std::env::var(kind.api_key_env_var()) {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        let stored = match kind {
            ProviderKind::Remote => self.remote.api_key.as_ref(),
            ProviderKind::Live => self.live.api_key.as_ref(),
        };
        stored.filter(|k| !k.trim().is_empty()).cloned()
    }
}
