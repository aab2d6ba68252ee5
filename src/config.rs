use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::recipe::wizard::WizardSettings;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub wizard: WizardConfig,
    pub api: ApiConfig,
    pub data: DataConfig,
}

/// Wizard session tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Quiet window in milliseconds before a draft is autosaved.
    pub autosave_quiet_ms: u64,
    /// Age in hours after which a stored draft is discarded.
    pub draft_ttl_hours: i64,
}

/// Recipe backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/recipes` and `/tags` paths are joined onto.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub auth_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            autosave_quiet_ms: 2_500,
            draft_ttl_hours: 24,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl WizardConfig {
    pub fn to_settings(&self) -> WizardSettings {
        WizardSettings {
            autosave_quiet: Duration::from_millis(self.autosave_quiet_ms),
            draft_ttl: self.draft_ttl(),
        }
    }

    /// Draft lifetime, falling back to the default when the configured
    /// value is not positive or does not fit a duration.
    pub fn draft_ttl(&self) -> chrono::Duration {
        let fallback = WizardSettings::default().draft_ttl;
        if self.draft_ttl_hours <= 0 {
            log::warn!(
                "draft_ttl_hours = {} must be positive, using {}h",
                self.draft_ttl_hours,
                fallback.num_hours()
            );
            return fallback;
        }
        chrono::Duration::try_hours(self.draft_ttl_hours).unwrap_or_else(|| {
            log::warn!(
                "draft_ttl_hours = {} is out of range, using {}h",
                self.draft_ttl_hours,
                fallback.num_hours()
            );
            fallback
        })
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/recipe-wizard/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match Self::try_load_from(config_path) {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(ConfigError::Io(_)) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}, using defaults");
                Self::default()
            }
        }
    }

    /// Read and parse `config_path` without falling back.
    pub fn try_load_from(config_path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(config_path)?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("recipe-wizard"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("recipe-wizard").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
