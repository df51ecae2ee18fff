//! Persistent host settings (JSON file in the app data directory).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_LOG_FILTER: &str = "easel_core=info,easel_app=info";
const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the internal API. `None` uses the in-process plan lookup.
    pub server_host: Option<String>,
    pub backend_timeout_ms: u64,
    pub log_filter: String,
    pub track_events: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            server_host: None,
            backend_timeout_ms: DEFAULT_BACKEND_TIMEOUT_MS,
            log_filter: DEFAULT_LOG_FILTER.into(),
            track_events: true,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.server_host = self
            .server_host
            .as_deref()
            .map(normalize_server_host)
            .filter(|h| !h.is_empty());
        self.backend_timeout_ms = self.backend_timeout_ms.clamp(100, 120_000);
        if self.log_filter.trim().is_empty() {
            self.log_filter = DEFAULT_LOG_FILTER.into();
        } else {
            self.log_filter = self.log_filter.trim().to_string();
        }
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_millis(self.backend_timeout_ms)
    }
}

pub fn normalize_server_host(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

const SERVER_HOST_ENV: &str = "EASEL_SERVER_HOST";

/// `EASEL_SERVER_HOST` wins over the file value.
pub fn apply_env_overrides(settings: &mut AppSettings) {
    let host = std::env::var(SERVER_HOST_ENV).ok();
    override_server_host(settings, host.as_deref());
}

/// Replace the server host when `raw` is set. A blank value clears it.
fn override_server_host(settings: &mut AppSettings, raw: Option<&str>) {
    if let Some(raw) = raw {
        let host = normalize_server_host(raw);
        settings.server_host = if host.is_empty() { None } else { Some(host) };
    }
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Easel")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".local")
                    .join("share")
            })
            .join("easel")
            .join("settings.json")
    }
}

pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    apply_env_overrides(&mut settings);
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
