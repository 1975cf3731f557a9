use crate::storage::DEFAULT_MAX_VALUE_BYTES;
use crate::store::EVENTS_KEY;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DATA_DIR_FALLBACK: &str = ".calstash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding stored values; defaults to the platform data dir
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_events_key")]
    pub events_key: String,
    #[serde(default = "default_max_value_bytes")]
    pub max_value_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_events_key() -> String {
    EVENTS_KEY.to_string()
}

fn default_max_value_bytes() -> u64 {
    DEFAULT_MAX_VALUE_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            events_key: default_events_key(),
            max_value_bytes: default_max_value_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Directory the file storage should use.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        if let Some(proj_dirs) = project_dirs() {
            return Ok(proj_dirs.data_dir().to_path_buf());
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(DATA_DIR_FALLBACK))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "calstash", "calstash")
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = project_dirs().context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
