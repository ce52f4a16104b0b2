use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::generation::DEFAULT_API_BASE;
use crate::tree::seed::DEFAULT_FOLDER_ID;

const APP_NAME: &str = "elysia-library";
const CONFIG_FILE: &str = "config.json";

/// Default export filename.
pub const DEFAULT_EXPORT_FILE: &str = "elysia_core_memory.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model identifier passed to the generation service
    pub model: String,
    /// Base URL of the generation API
    pub api_base_url: String,
    /// Timeout for one generation request, in seconds
    pub request_timeout_secs: u64,
    /// Simulated integration latency, in milliseconds. Zero disables the wait.
    pub integration_delay_ms: u64,
    /// Where `export` writes when no path is given
    pub export_file: PathBuf,
    /// Folder that receives new knowledge by default
    pub default_folder_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: 60,
            integration_delay_ms: 2500,
            export_file: PathBuf::from(DEFAULT_EXPORT_FILE),
            default_folder_id: DEFAULT_FOLDER_ID.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from the user's config directory.
    /// Returns default config if the file doesn't exist or fails to parse.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => Ok(p.to_path_buf()),
            None => get_config_path(),
        };
        match path.and_then(|p| Self::try_load(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;

        let config = serde_json::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn integration_delay(&self) -> Duration {
        Duration::from_millis(self.integration_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
