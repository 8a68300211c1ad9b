use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Ripple chat service
    pub service_url: String,

    /// Timeout applied to every service request, in seconds. Expiry
    /// counts as a network failure.
    pub request_timeout_secs: u64,

    /// Ripple home directory
    pub ripple_home: PathBuf,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    /// Show suggested prompts while the thread holds only the greeting
    pub show_quick_questions: bool,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
        let ripple_home = home.join(".ripple");

        Config {
            service_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 60,
            ripple_home,
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            theme: "dark".to_string(),
            show_quick_questions: true,
        }
    }
}

impl Config {
    /// Load configuration from ~/.ripple/config.toml, creating the
    /// directory on first run.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let ripple_home = home.join(".ripple");
        let config_path = ripple_home.join("config.toml");

        fs::create_dir_all(&ripple_home).context("Failed to create .ripple directory")?;

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.ripple_home = ripple_home;

        Ok(config)
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let config_path = self.ripple_home.join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(())
    }
}
