use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

use super::alerts::model::AlertPolicy;
use super::dispatch::DispatchConfig;

/// Engine settings for one embedding client.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// How often to pull a fresh inventory snapshot
    pub poll_interval_seconds: u64,
    /// Alert derivation tunables
    #[serde(default)]
    pub alert_policy: AlertPolicy,
    /// Notification dispatch tunables
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 30,
            alert_policy: AlertPolicy::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                if let Ok(settings) = serde_json::from_str(&content) {
                    return settings;
                }
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}
