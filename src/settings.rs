use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::categorizer::CategoryRule;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Currency assumed when a statement row names none.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Bytes (or characters of extracted text) handed to content detectors.
    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,
    /// env_logger filter used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,
}

fn default_currency() -> String {
    "RUB".to_string()
}

fn default_sniff_bytes() -> usize {
    2048
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            sniff_bytes: default_sniff_bytes(),
            log_level: default_log_level(),
            category_rules: Vec::new(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("statement-import")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed settings {}: {e}", path.display());
            Settings::default()
        }),
        Err(e) => {
            log::warn!("cannot read settings {}: {e}", path.display());
            Settings::default()
        }
    }
}
