use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_max_chips")]
    pub max_chips: usize,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            debounce_ms: default_debounce_ms(),
            history_cap: default_history_cap(),
            max_chips: default_max_chips(),
            leaderboard_size: default_leaderboard_size(),
            storage_path: default_storage_path(),
            log_dir: default_log_dir(),
            request_timeout_ms: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::from_path(&resolve_config_path())?;
        if let Ok(url) = env::var("WORDCHIPS_API_URL") {
            config.api_url = url;
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("failed to parse TOML from {}", path.display()))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "wordchips", "wordchips")
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("WORDCHIPS_CONFIG") {
        return PathBuf::from(path);
    }
    match project_dirs() {
        Some(proj) => proj.config_dir().join("config.toml"),
        None => PathBuf::from("./wordchips.toml"),
    }
}

fn data_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_api_url() -> String {
    "http://127.0.0.1:9090".to_string()
}

fn default_debounce_ms() -> u64 {
    120
}

fn default_history_cap() -> usize {
    15
}

fn default_max_chips() -> usize {
    5
}

fn default_leaderboard_size() -> usize {
    3
}

fn default_storage_path() -> PathBuf {
    data_dir().join("storage.json")
}

fn default_log_dir() -> PathBuf {
    data_dir().join("logs")
}
