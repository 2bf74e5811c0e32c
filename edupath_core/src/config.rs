//! Application configuration
//!
//! Loaded from an optional YAML file, then overlaid with the API credential
//! from the environment. Every field has a default so a missing file is not
//! an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variables consulted for the credential, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "EDUPATH_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// What to do with the displayed curriculum when a refinement fails
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefineFailurePolicy {
    /// Drop the workspace, same as a failed fresh generation
    #[default]
    ClearWorkspace,
    /// Leave the previously displayed curriculum in place
    KeepPrevious,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Credential for the generator service; usually taken from the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub thinking_budget: u32,
    /// Ask the service to ground the answer in web search results
    pub search_grounding: bool,
    /// No timeout unless set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub refine_failure: RefineFailurePolicy,
    /// Delay before the exported dossier opens the print dialog
    pub print_delay_ms: u64,
    /// Coarse tick of the reminder watcher
    pub reminder_tick_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-pro-preview".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            thinking_budget: 4000,
            search_grounding: false,
            request_timeout_secs: None,
            refine_failure: RefineFailurePolicy::ClearWorkspace,
            print_delay_ms: 500,
            reminder_tick_secs: 60,
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Parse a YAML document; absent fields take their defaults
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("[CONFIG] No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from `$EDUPATH_CONFIG` or the platform config directory, then
    /// take the credential from the environment when the file has none
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match default_config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay environment values using `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            self.api_key = API_KEY_VARS
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty());
        }
    }

    /// Directory holding the durable store
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("edupath")
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolved_data_dir().join("edupath.db")
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("edupath").join("config.yaml"))
}
