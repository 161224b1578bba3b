//! Configuration management

use crate::domain::sanitize::PastePolicy;
use crate::error::{DiaryError, Result};
use crate::infrastructure::backend::ReadinessProbe;
use crate::infrastructure::repository::DIARY_DIR;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the configured remote location
pub const REMOTE_ENV: &str = "DIARY_REMOTE";

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory backing the remote store; relative paths resolve against the diary root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<PathBuf>,
    #[serde(default)]
    pub paste_policy: PastePolicy,
    pub editor: String,
    #[serde(default = "default_poll_interval_ms")]
    pub ready_poll_interval_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub ready_timeout_ms: u64,
    pub created: DateTime<Utc>,
}

impl Config {
    /// Create a new config with default values
    pub fn new(remote_path: Option<PathBuf>) -> Self {
        Config {
            remote_path,
            paste_policy: PastePolicy::default(),
            editor: Self::detect_default_editor(),
            ready_poll_interval_ms: default_poll_interval_ms(),
            ready_timeout_ms: default_timeout_ms(),
            created: Utc::now(),
        }
    }

    /// Load config from .diary/config.toml in the given directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join(DIARY_DIR).join("config.toml");

        let contents = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DiaryError::NotDiaryDirectory(path.to_path_buf())
            } else {
                DiaryError::Io(e)
            }
        })?;

        toml::from_str(&contents)
            .map_err(|e| DiaryError::Config(format!("Failed to parse config.toml: {}", e)))
    }

    /// Save config to .diary/config.toml in the given directory
    pub fn save_to_dir(&self, path: &Path) -> Result<()> {
        let diary_dir = path.join(DIARY_DIR);
        let config_path = diary_dir.join("config.toml");

        if !diary_dir.exists() {
            fs::create_dir(&diary_dir)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| DiaryError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the editor command, checking environment variables first
    pub fn get_editor(&self) -> String {
        std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| self.editor.clone())
    }

    /// Remote directory for this diary, if any. `DIARY_REMOTE` wins over the config file.
    pub fn resolve_remote(&self, root: &Path) -> Option<PathBuf> {
        self.resolve_remote_with(root, std::env::var_os(REMOTE_ENV))
    }

    fn resolve_remote_with(&self, root: &Path, env_value: Option<OsString>) -> Option<PathBuf> {
        let configured = match env_value {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => self.remote_path.clone()?,
        };

        if configured.is_absolute() {
            Some(configured)
        } else {
            Some(root.join(configured))
        }
    }

    pub fn readiness_probe(&self) -> ReadinessProbe {
        ReadinessProbe::new(
            Duration::from_millis(self.ready_poll_interval_ms),
            Duration::from_millis(self.ready_timeout_ms),
        )
    }

    fn detect_default_editor() -> String {
        std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(windows) {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            })
    }
}
