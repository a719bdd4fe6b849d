//! Run configuration
//!
//! One explicit struct carried into the pipeline at construction. Loaded
//! from `~/.wablast/config.toml` when present; every field has a default so
//! a partial file (or none at all) works.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Result, WablastError};

/// Configuration for a wablast run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root URL of WhatsApp Web
    #[serde(default = "default_whatsapp_url")]
    pub whatsapp_url: String,

    /// Persistent browser profile; login state survives runs through it
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,

    /// Directory of named message templates (`<name>.txt`)
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Daily log files land here
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,

    /// Failed-contact CSV exports land here
    #[serde(default = "default_failed_dir")]
    pub failed_dir: PathBuf,

    /// Inter-message pacing bounds
    #[serde(default)]
    pub delays: DelayConfig,

    /// DOM wait bounds
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Browser window size
    #[serde(default)]
    pub viewport: ViewportConfig,
}

/// Randomized pacing between deliveries, uniform over `[min_secs, max_secs]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DelayConfig {
    #[serde(default = "default_min_delay")]
    pub min_secs: u64,

    #[serde(default = "default_max_delay")]
    pub max_secs: u64,
}

/// Upper bounds on the blocking DOM waits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Waiting for the authenticated-state marker after launch
    #[serde(default = "default_login_timeout")]
    pub login_secs: u64,

    /// Waiting for the message composer to become interactive
    #[serde(default = "default_composer_timeout")]
    pub composer_secs: u64,

    /// Waiting for the attachment preview's confirm control
    #[serde(default = "default_attach_timeout")]
    pub attach_secs: u64,
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: u32,

    #[serde(default = "default_viewport_height")]
    pub height: u32,
}

// Default value providers

fn default_whatsapp_url() -> String {
    "https://web.whatsapp.com".to_string()
}

fn base_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wablast")
}

fn default_profile_dir() -> PathBuf {
    base_dir().join("profile")
}

fn default_templates_dir() -> PathBuf {
    base_dir().join("templates")
}

fn default_logs_dir() -> PathBuf {
    base_dir().join("logs")
}

fn default_failed_dir() -> PathBuf {
    base_dir().join("failed_contacts")
}

fn default_min_delay() -> u64 {
    5
}

fn default_max_delay() -> u64 {
    15
}

fn default_login_timeout() -> u64 {
    60
}

fn default_composer_timeout() -> u64 {
    30
}

fn default_attach_timeout() -> u64 {
    20
}

fn default_viewport_width() -> u32 {
    1366
}

fn default_viewport_height() -> u32 {
    768
}

impl AppConfig {
    /// Default on-disk location: `~/.wablast/config.toml`
    pub fn default_path() -> PathBuf {
        base_dir().join("config.toml")
    }

    /// Load configuration from `path` (or the default location), falling
    /// back to defaults when no file exists
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)
                .map_err(|e| WablastError::Config(format!("failed to parse config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default configuration to `path` (or the default location)
    pub fn write_default(path: Option<&Path>) -> Result<PathBuf> {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| WablastError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.login_secs)
    }

    pub fn composer_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.composer_secs)
    }

    pub fn attach_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.attach_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            whatsapp_url: default_whatsapp_url(),
            profile_dir: default_profile_dir(),
            templates_dir: default_templates_dir(),
            logs_dir: default_logs_dir(),
            failed_dir: default_failed_dir(),
            delays: DelayConfig::default(),
            timeouts: TimeoutConfig::default(),
            viewport: ViewportConfig::default(),
        }
    }
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            min_secs: default_min_delay(),
            max_secs: default_max_delay(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_secs: default_login_timeout(),
            composer_secs: default_composer_timeout(),
            attach_secs: default_attach_timeout(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}
